//! Gini / uniqueness table for a handful of small setups.
//!
//! Prints, per setup:
//! - mu and sigma of row-wise Gini over the TP matrix
//! - mu and sigma of row-wise Gini over the MFPT matrix
//! - mean and std of the random-walk unique fraction
//!
//! Matrices are cached under `$TMPDIR/opchain-gini-table`. Set `RUST_LOG=debug` to see cache hits.

use opchain::experiment::{sweep, ExperimentConfig, Setup};
use opchain::store::TextStore;
use opchain::{GaMutation, TspMove};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_target(false)
        .init();

    let setups = [
        Setup::Ga {
            length: 6,
            mutation: GaMutation::PerGene,
        },
        Setup::Ga {
            length: 8,
            mutation: GaMutation::PerGene,
        },
        Setup::Ga {
            length: 6,
            mutation: GaMutation::PerInd,
        },
        Setup::Ga {
            length: 8,
            mutation: GaMutation::PerInd,
        },
        Setup::Tsp {
            length: 5,
            mv: TspMove::TwoOpt,
        },
        Setup::Tsp {
            length: 5,
            mv: TspMove::ThreeOpt,
        },
        Setup::Tsp {
            length: 5,
            mv: TspMove::Swap,
        },
    ];

    let mut store = TextStore::new(std::env::temp_dir().join("opchain-gini-table"));
    let cfg = ExperimentConfig::default();
    let rows = sweep(&setups, &mut store, &cfg)?;

    println!("setup                    states  mu(G(tp)) sd(G(tp)) mu(G(mfpt)) sd(G(mfpt))  uniq");
    for r in &rows {
        let (u_mu, u_sd) = r.unique_mean_std().unwrap_or((f64::NAN, f64::NAN));
        let (m_mu, m_sd) = r.mfpt_gini.unwrap_or((f64::NAN, f64::NAN));
        println!(
            "{:<24} {:>6}  {:>9.3} {:>9.3} {:>11.3} {:>11.3}  {:.3}±{:.3}",
            r.name, r.states, r.tp_gini.0, r.tp_gini.1, m_mu, m_sd, u_mu, u_sd
        );
    }
    Ok(())
}
