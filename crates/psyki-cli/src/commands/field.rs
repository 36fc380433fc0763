use psyki_core::{field_statistic_all, field_statistic_at_index};

pub fn run(
    data: &str,
    config_path: Option<&str>,
    name: &str,
    index: Option<u32>,
    all: bool,
    output_path: Option<&str>,
) {
    let config = super::load_config(config_path);
    let dataset = super::load_dataset(data);

    let stat = if all {
        field_statistic_all(&dataset, name)
    } else {
        field_statistic_at_index(&dataset, name, index.unwrap_or(config.final_index))
    };

    let scope = match stat.index {
        Some(i) => format!("trial {i}"),
        None => "all trials".to_string(),
    };
    println!("{name} over {scope}: {} values", stat.count);
    println!("  mean   {:.4}", stat.mean);
    println!("  median {:.4}", stat.median);

    if let Some(path) = output_path {
        super::write_json(path, &stat);
    }
}
