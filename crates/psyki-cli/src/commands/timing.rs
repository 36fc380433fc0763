use psyki_core::time_on_task;

pub fn run(
    data: &str,
    config_path: Option<&str>,
    start: Option<u32>,
    end: Option<u32>,
    output_path: Option<&str>,
) {
    let config = super::load_config(config_path);
    let dataset = super::load_dataset(data);
    let start = start.unwrap_or(config.first_index);
    let end = end.unwrap_or(config.final_index);

    let summary = time_on_task(&dataset, start, end);

    println!("Time on task, trial {start} → {end}\n");
    for t in &summary.per_participant {
        match t.elapsed_ms {
            Some(ms) => println!("  {:<32} {:>10.1} s", t.participant, ms as f64 / 1000.0),
            None => println!("  {:<32} {:>10}", t.participant, "n/a"),
        }
    }
    println!(
        "\n  {} of {} measured: mean {:.1} s, median {:.1} s",
        summary.measured,
        summary.per_participant.len(),
        summary.mean_ms / 1000.0,
        summary.median_ms / 1000.0
    );

    if let Some(path) = output_path {
        super::write_json(path, &summary);
    }
}
