use rand::rngs::StdRng;
use rand::SeedableRng;
use sbh_core::{
    build_cost_matrix, error_rate, evaluate, generate_instance, greedy_path, merge_path, AcoEngine, AcoParams,
    EdgeOrientation, GreedyParams, InstanceParams, ReadSet, RunConfig, RunController, ScoreWeights, StopReason,
};

fn rotation_reads() -> ReadSet {
    ReadSet::new(["ACGT", "CGTA", "GTAC", "TACG"].iter().map(|s| s.to_string()).collect())
        .expect("valid reads")
}

fn is_anchored_permutation(path: &[usize], n: usize) -> bool {
    let mut sorted = path.to_vec();
    sorted.sort_unstable();
    path.first() == Some(&0) && sorted == (0..n).collect::<Vec<_>>()
}

#[test]
fn rotations_converge_to_perfect_chain() {
    let params = AcoParams {
        weights: ScoreWeights {
            orientation: EdgeOrientation::Outgoing,
            ..Default::default()
        },
        seed: Some(2024),
        ..Default::default()
    };
    let mut engine = AcoEngine::from_reads(&rotation_reads(), params).expect("engine");
    let outcome = RunController::new(RunConfig::default())
        .expect("controller")
        .run(&mut engine)
        .expect("run");

    let path = outcome.solution.path.expect("best path");
    assert_eq!(path, vec![0, 1, 2, 3]);
    assert_eq!(outcome.solution.score, 3000.0);

    let breakdown = evaluate(&path, engine.costs(), &engine.params().weights);
    assert_eq!(breakdown.perfect, 3);

    let merged = merge_path(&path, &rotation_reads(), engine.costs());
    assert_eq!(merged.sequence, "ACGTACG");
}

#[test]
fn default_run_reports_consistent_best() {
    let mut engine = AcoEngine::from_reads(
        &rotation_reads(),
        AcoParams {
            seed: Some(7),
            ..Default::default()
        },
    )
    .expect("engine");
    let outcome = RunController::new(RunConfig::default())
        .expect("controller")
        .run(&mut engine)
        .expect("run");

    let path = outcome.solution.path.expect("best path");
    assert!(is_anchored_permutation(&path, 4));
    assert_eq!(sbh_core::score(&path, engine.costs()), outcome.solution.score);
    assert_eq!(outcome.solution.history.len(), outcome.iterations);
    let best_seen = outcome.solution.history.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(best_seen, outcome.solution.score);
}

#[test]
fn stagnation_stops_after_dropout_threshold() {
    for seed in 0..5 {
        let mut engine = AcoEngine::from_reads(
            &rotation_reads(),
            AcoParams {
                seed: Some(seed),
                ..Default::default()
            },
        )
        .expect("engine");
        let outcome = RunController::new(RunConfig {
            max_iterations: None,
            timeout_secs: None,
            dropout_threshold: Some(3),
        })
        .expect("controller")
        .run(&mut engine)
        .expect("run");

        assert_eq!(outcome.reason, StopReason::Stagnation);

        // Index of the last iteration that raised the running best
        let history = &outcome.solution.history;
        let mut best = f64::NEG_INFINITY;
        let mut last_improvement = 0;
        for (i, &score) in history.iter().enumerate() {
            if score > best {
                best = score;
                last_improvement = i;
            }
        }
        assert_eq!(history.len(), last_improvement + 1 + 3, "seed {seed}");
    }
}

#[test]
fn iteration_cap_wins_over_other_conditions() {
    let mut engine = AcoEngine::from_reads(
        &rotation_reads(),
        AcoParams {
            seed: Some(1),
            ..Default::default()
        },
    )
    .expect("engine");
    let outcome = RunController::new(RunConfig {
        max_iterations: Some(2),
        timeout_secs: Some(300.0),
        dropout_threshold: Some(50),
    })
    .expect("controller")
    .run(&mut engine)
    .expect("run");

    assert_eq!(outcome.reason, StopReason::MaxIterations);
    assert_eq!(outcome.iterations, 2);
}

#[test]
fn generated_instance_pipeline() {
    let mut rng = StdRng::seed_from_u64(99);
    let params = InstanceParams {
        dna_length: 80,
        k: 7,
        negative_errors_percent: 2,
        positive_errors_percent: 2,
    };
    let spectrum = generate_instance(&params, None, &mut rng).expect("instance");
    let reads = spectrum.reads().expect("reads");
    let costs = build_cost_matrix(&reads);

    let mut engine = AcoEngine::new(
        costs.clone(),
        AcoParams {
            seed: Some(5),
            weights: ScoreWeights {
                orientation: EdgeOrientation::Outgoing,
                ..Default::default()
            },
            ..Default::default()
        },
    )
    .expect("engine");
    let outcome = RunController::new(RunConfig {
        max_iterations: Some(15),
        ..Default::default()
    })
    .expect("controller")
    .run(&mut engine)
    .expect("run");

    let path = outcome.solution.path.expect("best path");
    assert!(is_anchored_permutation(&path, reads.len()));
    let merged = merge_path(&path, &reads, &costs);
    assert!(merged.sequence.starts_with(reads.anchor()));
    let rate = error_rate(&merged.sequence, &spectrum.original_dna);
    assert!(rate.is_finite() && rate >= 0.0);

    let greedy = greedy_path(
        &costs,
        reads.read_len(),
        &GreedyParams {
            target_length: Some(spectrum.original_dna.len()),
            ..Default::default()
        },
    );
    let merged = merge_path(&greedy, &reads, &costs);
    assert!(merged.sequence.len() >= reads.read_len());
    assert!(error_rate(&merged.sequence, &spectrum.original_dna).is_finite());
}
