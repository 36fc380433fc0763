use psyki_core::{SdtReport, aid_by_name, analyze_participant, rolling_feedback};

pub struct ParticipantCommandConfig<'a> {
    pub data: &'a str,
    pub config_path: Option<&'a str>,
    pub id: &'a str,
    pub aid: &'a str,
    pub seed: u64,
    pub show_trials: bool,
    pub output_path: Option<&'a str>,
}

pub fn run(cmd: ParticipantCommandConfig) {
    let config = super::load_config(cmd.config_path);
    let dataset = super::load_dataset(cmd.data);

    let Some(participant) = dataset.get(cmd.id) else {
        eprintln!("Unknown participant '{}'. Available:", cmd.id);
        for p in dataset.iter() {
            eprintln!("  {}", p.id);
        }
        std::process::exit(1);
    };
    let Some(aid) = aid_by_name(cmd.aid, cmd.seed, config.simulation_params()) else {
        eprintln!("Unknown aid '{}'. Use stored, simulated or fixed.", cmd.aid);
        std::process::exit(1);
    };

    let trials = &participant.trials;
    let model = config.sensitivity_model();
    let analysis = analyze_participant(
        trials,
        &config.button_classifier(),
        &model,
        aid.as_ref(),
        config.combiner_settings(),
    );
    let button = SdtReport::compute(trials, &config.button_report(), &model);
    let slider = SdtReport::compute(trials, &config.slider_report(), &model);
    let (agree, compared) = analysis.team_agreement();
    let feedback = trials.len().checked_sub(1).and_then(|last| {
        rolling_feedback(trials, last, config.feedback_window, config.feedback_scale)
    });

    let s = &analysis.summary;
    println!("Participant {} ({} trials, aid: {})\n", participant.id, trials.len(), aid.name());
    println!(
        "  Button choices   H {:<4} M {:<4} FA {:<4} CR {:<4} accuracy {:.2}%",
        s.counts.hits, s.counts.misses, s.counts.false_alarms, s.counts.correct_rejections, s.accuracy
    );
    println!(
        "  Rates            hit {:.3}  false alarm {:.3}",
        s.rates.hit_rate, s.rates.false_alarm_rate
    );
    println!(
        "  d′               human {:.2}  aid {:.2}  team {:.2}",
        s.d_prime_human, s.d_prime_aid, s.d_prime_team
    );
    println!(
        "  Weights          aHuman {:.3}  aAid {:.3}",
        s.weights.a_human, s.weights.a_aid
    );
    println!("  Team agreement   {agree}/{compared} trials match the button choice");

    println!("\n  Reports (assisted trials):");
    for (name, r) in [("button", &button), ("slider", &slider)] {
        println!(
            "    {:<7} n={:<4} HR {:.3} FAR {:.3}  d′ human {:.2} team {:.2} simple {:.2}",
            name,
            r.counts.total(),
            r.rates.hit_rate,
            r.rates.false_alarm_rate,
            r.d_primes.human,
            r.d_primes.team,
            r.d_primes.team_simple,
        );
    }

    if let Some(ref f) = feedback {
        println!(
            "\n  Feedback (last {} responses): avg diff {:.2}, accuracy {:.2}",
            f.diffs.len(),
            f.avg_diff,
            f.avg_accuracy
        );
    }

    if cmd.show_trials {
        println!(
            "\n  {:>5} {:<18} {:>8} {:>8} {:>8}  {}",
            "Index", "Outcome", "XHuman", "XAid", "Z", "Team"
        );
        for t in &analysis.trials {
            let index = t.index.map(|i| i.to_string()).unwrap_or_else(|| "-".into());
            let outcome = t
                .classification
                .map(|o| format!("{o:?}"))
                .unwrap_or_else(|| "-".into());
            match t.evidence {
                Some(ev) => println!(
                    "  {:>5} {:<18} {:>8.3} {:>8.3} {:>8.3}  {}",
                    index, outcome, ev.x_human, ev.x_aid, ev.z, ev.decision
                ),
                None => println!("  {index:>5} {outcome:<18} {:>8} {:>8} {:>8}  -", "-", "-", "-"),
            }
        }
    }

    if let Some(path) = cmd.output_path {
        super::write_json(
            path,
            &serde_json::json!({
                "id": participant.id,
                "aid": aid.name(),
                "analysis": analysis,
                "teamAgreement": { "agree": agree, "compared": compared },
                "buttonReport": button,
                "sliderReport": slider,
                "feedback": feedback,
            }),
        );
    }
}
