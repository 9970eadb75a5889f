//! TSP operator comparison on short tours.
//!
//! Prints:
//! - pairwise RMSE between the TP matrices of 2-opt, 3-opt, broad 3-opt and swap
//! - Gini summaries for every compound (uniformly mixed) subset of those operators

use opchain::experiment::{compound_operators, operator_difference};
use opchain::TspMove;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_target(false)
        .init();

    let length = 6usize;

    println!("operator pair            rmse");
    for d in operator_difference(length, &TspMove::ALL)? {
        let pair = format!("{}+{}", d.a.name(), d.b.name());
        println!("{pair:<24} {:.6}", d.rmse);
    }

    println!();
    println!("operator(s)                  mu(G(tp)) sd(G(tp)) mu(G(mfpt)) sd(G(mfpt))");
    for c in compound_operators(length, &TspMove::ALL)? {
        println!(
            "{:<28} {:>9.3} {:>9.3} {:>11.3} {:>11.3}",
            c.label(),
            c.tp_gini.0,
            c.tp_gini.1,
            c.mfpt_gini.0,
            c.mfpt_gini.1
        );
    }
    Ok(())
}
