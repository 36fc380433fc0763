use psyki_core::{
    AccuracyTally, AgreementDetail, AgreementReport, ai_slider_agreement, ai_slider_differences,
    slider_button_agreement, stratified_accuracy,
};

pub struct CompareCommandConfig<'a> {
    pub data: &'a str,
    pub config_path: Option<&'a str>,
    pub view: &'a str,
    pub detail: AgreementDetail,
    pub threshold: Option<f64>,
    pub output_path: Option<&'a str>,
}

pub fn run(cmd: CompareCommandConfig) {
    let config = super::load_config(cmd.config_path);
    let dataset = super::load_dataset(cmd.data);
    let threshold = cmd.threshold.unwrap_or(config.slider_threshold);

    let json = match cmd.view {
        "agreement" => {
            let report = slider_button_agreement(&dataset, threshold, cmd.detail);
            println!("Slider side vs button choice (slider > {threshold} → blue)\n");
            print_agreement(&report);
            serde_json::json!(report)
        }
        "ai-agreement" => {
            let report = ai_slider_agreement(&dataset, threshold, config.boundary, cmd.detail);
            println!(
                "Slider side vs aid guess side (slider > {threshold}, aid > {})\n",
                config.boundary
            );
            print_agreement(&report);
            serde_json::json!(report)
        }
        "ai-difference" => {
            let report = ai_slider_differences(&dataset);
            println!("Slider − aid guess\n");
            if cmd.detail != AgreementDetail::Overall {
                for p in &report.per_participant {
                    println!(
                        "  {:<5} {:<28} n={:<4} mean {:>8.3}  mean |diff| {:>8.3}",
                        p.label,
                        p.participant,
                        p.comparisons.len(),
                        p.mean_difference,
                        p.mean_abs_difference
                    );
                    if cmd.detail == AgreementDetail::PerTrial {
                        for c in &p.comparisons {
                            println!(
                                "        trial {:>4}  slider {:>8.2}  aid {:>6.2}  diff {:>8.2}",
                                fmt_index(c.index),
                                c.slider_value,
                                c.ai_guess_value,
                                c.difference
                            );
                        }
                    }
                }
                println!();
            }
            println!(
                "  Overall: {} comparisons, mean {:.3}, mean |diff| {:.3}",
                report.comparisons, report.mean_difference, report.mean_abs_difference
            );
            serde_json::json!(report)
        }
        "accuracy" => {
            let rows = stratified_accuracy(&dataset, config.stimulus, threshold);
            println!("Accuracy by response and phase\n");
            println!(
                "  {:<5} {:<28} {:>18} {:>18} {:>18}",
                "#", "Participant", "Button", "Slider (assisted)", "Slider (alone)"
            );
            for r in &rows {
                println!(
                    "  {:<5} {:<28} {:>18} {:>18} {:>18}",
                    r.label,
                    r.participant,
                    fmt_tally(&r.button_comparison),
                    fmt_tally(&r.slider_when_button_exists),
                    fmt_tally(&r.slider_only_trials),
                );
            }
            serde_json::json!(rows)
        }
        other => {
            eprintln!("Unknown view '{other}'.");
            std::process::exit(1);
        }
    };

    if let Some(path) = cmd.output_path {
        super::write_json(path, &json);
    }
}

fn print_agreement(report: &AgreementReport) {
    for p in &report.per_participant {
        println!(
            "  {:<5} {:<28} {:>4}/{:<4} {:>7.2}%",
            p.label, p.participant, p.counts.matches, p.counts.comparisons, p.match_percentage
        );
        for c in &p.comparisons {
            let other = c
                .other_value
                .map(|v| format!(" ({v:.2})"))
                .unwrap_or_default();
            println!(
                "        trial {:>4}  slider {:>7.2} → {:<6}  other {}{}  {}",
                fmt_index(c.index),
                c.slider_value,
                c.slider_side,
                c.other_side,
                other,
                if c.is_match { "match" } else { "mismatch" }
            );
        }
    }
    if !report.per_participant.is_empty() {
        println!();
    }
    println!(
        "  Overall: {} matches, {} mismatches of {} ({:.2}%)",
        report.overall.matches,
        report.overall.mismatches,
        report.overall.comparisons,
        report.match_percentage
    );
}

fn fmt_tally(t: &AccuracyTally) -> String {
    format!("{}/{} {:.2}%", t.correct, t.total, t.accuracy_percentage)
}

fn fmt_index(index: Option<u32>) -> String {
    index.map(|i| i.to_string()).unwrap_or_else(|| "-".into())
}
