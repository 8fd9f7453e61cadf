use std::time::Duration;

use splitmerge::update_handler::{ProgressBar, Timeout};
use splitmerge::{ChainSummary, Engine};

use crate::opt;

fn summary_rows(summaries: &[ChainSummary]) -> Vec<Vec<String>> {
    summaries
        .iter()
        .map(|summary| {
            vec![
                format!("{}", summary.chain_id),
                format!("{}", summary.n_iters),
                format!("{}", summary.n_occupied),
                format!("{:.4}", summary.acceptance_rate),
                format!("{:.6}", summary.ln_target),
            ]
        })
        .collect()
}

pub fn run(cmd: opt::RunArgs) -> i32 {
    let config = match cmd.run_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            return 1;
        }
    };

    let mut engine = match Engine::new(&config) {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("Could not create engine: {err}");
            return 1;
        }
    };

    log::info!(
        "Running {} chains of {} iterations on {} items in {} slots",
        config.n_chains,
        config.n_iters,
        config.n_items,
        config.n_slots
    );

    let timeout =
        Timeout::new(cmd.timeout.map_or(Duration::MAX, Duration::from_secs));

    if cmd.quiet {
        engine.run(config.n_iters, timeout);
    } else {
        engine.run(config.n_iters, (timeout, ProgressBar::new()));
    }

    let summaries = engine.summaries();

    let header = vec![
        String::from("Chain"),
        String::from("Iters"),
        String::from("K"),
        String::from("Accept"),
        String::from("ln f"),
    ];
    crate::utils::print_table(&header, &summary_rows(&summaries));

    if let Some(path) = cmd.output {
        let res = std::fs::File::create(&path)
            .map_err(|err| err.to_string())
            .and_then(|file| {
                serde_yaml::to_writer(file, &summaries)
                    .map_err(|err| err.to_string())
            });

        if let Err(err) = res {
            eprintln!("Could not write {path:?}: {err}");
            return 1;
        }
        println!("Wrote summary to {path:?}");
    }

    0
}
