use ndarray::{array, Array2};
use opchain::transition::validate_tp;
use opchain::{
    build_ga_tp, build_tp, build_tsp_tp, gini, mfpt, mix, mu_sigma_gini, rmse_distance,
    stationary, Error, GaMutation, RepresentationSpec, Result, TspMove, ROW_SUM_TOL,
};

fn all_small_chains() -> Result<Vec<(String, Array2<f64>)>> {
    let mut out = Vec::new();
    for mutation in [GaMutation::PerGene, GaMutation::PerInd] {
        for length in [2usize, 3, 5] {
            let tp = build_ga_tp(length, 1.0 / length as f64, mutation)?;
            out.push((format!("ga_{length}_{}", mutation.name()), tp));
        }
    }
    for mv in TspMove::ALL {
        for length in [3usize, 4, 5] {
            out.push((format!("tsp_{length}_{}", mv.name()), build_tsp_tp(length, mv)?));
        }
    }
    Ok(out)
}

#[test]
fn every_builder_yields_row_stochastic_chains_with_zero_mfpt_diagonal() -> Result<()> {
    for (name, tp) in all_small_chains()? {
        validate_tp(&tp.view(), ROW_SUM_TOL)?;
        for row in tp.rows() {
            assert!((row.sum() - 1.0).abs() <= 1e-6, "{name}: row sum");
        }
        let m = mfpt(&tp.view())?;
        for i in 0..m.nrows() {
            assert_eq!(m[[i, i]], 0.0, "{name}: diagonal");
        }
        assert!(
            m.iter().all(|&x| x >= 0.0 && x.is_finite()),
            "{name}: MFPT entries"
        );
    }
    Ok(())
}

#[test]
fn stationary_of_symmetric_operators_is_uniform() -> Result<()> {
    // Every builder here gives a doubly-stochastic matrix, so π is uniform.
    for (name, tp) in all_small_chains()? {
        let pi = stationary(&tp.view())?;
        let u = 1.0 / pi.len() as f64;
        assert!(
            pi.iter().all(|&p| (p - u).abs() < 1e-9),
            "{name}: stationary not uniform"
        );
    }
    Ok(())
}

#[test]
fn gini_reference_values() -> Result<()> {
    for k in 1..=20usize {
        assert!(gini(&vec![1.0 / k as f64; k])? < 1e-12);
        let mut hot = vec![0.0; k];
        hot[0] = 1.0;
        assert!((gini(&hot)? - (k as f64 - 1.0) / k as f64).abs() < 1e-12);
    }
    assert!(matches!(gini(&[0.0; 4]), Err(Error::InvalidDistribution(_))));
    Ok(())
}

#[test]
fn ga_per_gene_reference_case() -> Result<()> {
    let tp = build_tp(RepresentationSpec::Ga {
        length: 3,
        pmut: 0.5,
        mutation: GaMutation::PerGene,
    })?;
    assert_eq!(tp.dim(), (8, 8));
    assert!((tp[[0, 7]] - 0.125).abs() < 1e-15);
    for row in tp.rows() {
        assert!((row.sum() - 1.0).abs() < 1e-12);
    }
    Ok(())
}

#[test]
fn tsp_swap_reference_case() -> Result<()> {
    let tp = build_tsp_tp(4, TspMove::Swap)?;
    assert_eq!(tp.dim(), (24, 24));
    for row in tp.rows() {
        let nz: Vec<f64> = row.iter().copied().filter(|&p| p > 0.0).collect();
        assert_eq!(nz.len(), 6);
        assert!(nz.iter().all(|&p| (p - 1.0 / 6.0).abs() < 1e-15));
    }
    Ok(())
}

#[test]
fn mixing_and_distance_contracts() -> Result<()> {
    let swap = build_tsp_tp(5, TspMove::Swap)?;
    let two_opt = build_tsp_tp(5, TspMove::TwoOpt)?;

    assert_eq!(mix(&[1.0], &[swap.view()])?, swap);
    assert_eq!(rmse_distance(&swap.view(), &swap.view())?, 0.0);
    assert_eq!(
        rmse_distance(&swap.view(), &two_opt.view())?,
        rmse_distance(&two_opt.view(), &swap.view())?
    );

    let half = mix(&[0.5, 0.5], &[swap.view(), two_opt.view()])?;
    validate_tp(&half.view(), ROW_SUM_TOL)?;
    // The midpoint is half as far from each endpoint as they are from each other.
    let full = rmse_distance(&swap.view(), &two_opt.view())?;
    let to_mid = rmse_distance(&swap.view(), &half.view())?;
    assert!((to_mid - 0.5 * full).abs() < 1e-12);

    let small = build_tsp_tp(4, TspMove::Swap)?;
    assert!(matches!(
        mix(&[0.5, 0.5], &[swap.view(), small.view()]),
        Err(Error::DimensionMismatch(_))
    ));
    assert!(matches!(
        rmse_distance(&swap.view(), &small.view()),
        Err(Error::DimensionMismatch(_))
    ));
    Ok(())
}

#[test]
fn reducible_inputs_fail_loudly() {
    let blocks = array![
        [0.0, 1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
        [0.0, 0.0, 1.0, 0.0],
    ];
    assert!(matches!(stationary(&blocks.view()), Err(Error::ReducibleChain(_))));
    assert!(matches!(mfpt(&blocks.view()), Err(Error::ReducibleChain(_))));

    // pmut = 1 maps each bitstring to its complement: 2-cycles only.
    let complement = build_ga_tp(3, 1.0, GaMutation::PerGene).expect("valid parameters");
    assert!(matches!(mfpt(&complement.view()), Err(Error::ReducibleChain(_))));
}

#[test]
fn mfpt_gini_is_only_an_informal_concentration_measure() -> Result<()> {
    // MFPT rows are hitting times, not distributions: they do not sum to 1, and the Gini
    // value is still defined because only positive total mass is required.
    let tp = build_tsp_tp(4, TspMove::TwoOpt)?;
    let m = mfpt(&tp.view())?;
    assert!(m.rows().into_iter().all(|r| r.sum() > 1.0));
    let (mu, sigma) = mu_sigma_gini(&m.view())?;
    assert!(mu > 0.0 && mu < 1.0);
    assert!(sigma >= 0.0);
    Ok(())
}
