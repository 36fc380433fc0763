pub fn run(data: &str, config_path: Option<&str>, host: &str, port: u16) {
    let config = super::load_config(config_path);
    let dataset = super::load_dataset(data);

    let base = format!("http://{host}:{port}");

    println!("psyki analysis server v{}", psyki_core::VERSION);
    println!("   {base}");
    println!(
        "   {} participants, {} trials",
        dataset.len(),
        dataset.total_trials()
    );
    println!();
    println!("   Endpoints:");
    println!("     GET /                          API index (try: curl {base})");
    println!("     GET /health                    Dataset health check");
    println!("     GET /participants              Participants with tN labels");
    println!("     GET /api/v1/summary            Summary table and d′ distributions");
    println!("     GET /api/v1/participants/{{id}}  Optimal-weighting analysis");
    println!("     GET /api/v1/agreement          Slider vs button agreement");
    println!("     GET /api/v1/accuracy           Accuracy by phase");
    println!("     GET /api/v1/ai-agreement       Slider vs aid agreement and differences");
    println!("     GET /api/v1/timing             Time on task");
    println!("     GET /api/v1/field              Field mean/median (?name=&index=)");
    println!();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start runtime: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(psyki_server::run_server(dataset, config, host, port)) {
        eprintln!("Server error on {host}:{port}: {e}");
        std::process::exit(1);
    }
}
