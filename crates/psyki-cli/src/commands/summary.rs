use psyki_core::{
    BoxStats, DPrimeDistributions, ReferenceComparison, SummaryTable, mean_team_simple,
    median_team_simple,
};

pub struct SummaryCommandConfig<'a> {
    pub data: &'a str,
    pub config_path: Option<&'a str>,
    pub min_d_prime: Option<f64>,
    pub stimulus: Option<&'a str>,
    pub output_path: Option<&'a str>,
}

pub fn run(cmd: SummaryCommandConfig) {
    let mut config = super::load_config(cmd.config_path);
    if let Some(min) = cmd.min_d_prime {
        config.min_human_d_prime = min;
    }
    if let Some(name) = cmd.stimulus {
        match super::parse_stimulus(name) {
            Some(policy) => config.stimulus = policy,
            None => {
                eprintln!("Unknown stimulus convention '{name}'. Use percent or signed.");
                std::process::exit(1);
            }
        }
    }
    let dataset = super::load_dataset(cmd.data);

    let table = SummaryTable::build(&dataset, &config);
    let distributions = DPrimeDistributions::build(&dataset, &config);
    let reference = ReferenceComparison::build(&dataset, &config);
    let team_simple_mean = mean_team_simple(&dataset, &config);
    let team_simple_median = median_team_simple(&dataset, &config);

    println!(
        "SDT summary: {} of {} participants with human d′ >= {:.2}\n",
        table.rows.len(),
        dataset.len(),
        table.min_human_d_prime
    );
    println!(
        "  {:<5} {:<28} {:>4} {:>4} {:>4} {:>4} {:>6} {:>6} {:>7} {:>6} {:>6} {:>7}",
        "#", "Participant", "H", "M", "FA", "CR", "HR", "FAR", "Human", "AI", "Team", "Simple"
    );
    println!("  {}", "─".repeat(100));
    for row in &table.rows {
        let r = &row.report;
        println!(
            "  {:<5} {:<28} {:>4} {:>4} {:>4} {:>4} {:>6.2} {:>6.2} {:>7.2} {:>6.2} {:>6.2} {:>7.2}",
            row.label,
            truncate(&row.participant, 28),
            r.counts.hits,
            r.counts.misses,
            r.counts.false_alarms,
            r.counts.correct_rejections,
            r.rates.hit_rate,
            r.rates.false_alarm_rate,
            r.d_primes.human,
            r.d_primes.ai,
            r.d_primes.team,
            r.d_primes.team_simple,
        );
    }
    let m = &table.means;
    println!("  {}", "─".repeat(100));
    println!(
        "  {:<5} {:<28} {:>4.1} {:>4.1} {:>4.1} {:>4.1} {:>6.2} {:>6.2} {:>7.2} {:>6.2} {:>6.2} {:>7.2}",
        "Mean",
        "",
        m.hits,
        m.misses,
        m.false_alarms,
        m.correct_rejections,
        m.hit_rate,
        m.false_alarm_rate,
        m.human,
        m.ai,
        m.team,
        m.team_simple,
    );
    if !table.excluded.is_empty() {
        println!("\n  Excluded: {}", table.excluded.join(", "));
    }

    println!("\nd′ distributions (all participants):");
    print_box("human", &distributions.human.stats);
    print_box("ai", &distributions.ai.stats);
    print_box("team", &distributions.team.stats);
    print_box("teamSimple", &distributions.team_simple.stats);
    println!("\n  teamSimple mean {team_simple_mean:.2}, median {team_simple_median:.2}");

    println!(
        "\nReference: median {} at index {} = {:.2} over {} participants (reference {:.2}, {}{:.2})",
        reference.field,
        reference.index,
        reference.median,
        reference.participants,
        reference.reference,
        if reference.difference >= 0.0 { "+" } else { "" },
        reference.difference,
    );

    if let Some(path) = cmd.output_path {
        super::write_json(
            path,
            &serde_json::json!({
                "table": table,
                "distributions": distributions,
                "teamSimple": { "mean": team_simple_mean, "median": team_simple_median },
                "reference": reference,
            }),
        );
    }
}

fn print_box(name: &str, s: &BoxStats) {
    println!(
        "  {:<11} n={:<4} min {:>6.2}  q1 {:>6.2}  median {:>6.2}  q3 {:>6.2}  max {:>6.2}",
        name, s.count, s.min, s.q1, s.median, s.q3, s.max
    );
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let cut: String = s.chars().take(width.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
