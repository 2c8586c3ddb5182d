//! Tests for the architecture catalog
//!
//! This file tests every architecture including:
//! - Input and output shapes
//! - Shape compatibility at every merge node
//! - Sequence lengths at the stage boundaries
//! - Forward passes producing a probability distribution
//! - Seeded determinism

use approx::assert_abs_diff_eq;
use rta_cnn::architectures::{Architecture, INPUT_LENGTH};
use rta_cnn::graph::{Model, Shape};

fn build(arch: Architecture) -> Model {
    arch.build_with_seed(42)
        .unwrap_or_else(|e| panic!("{} failed to build: {}", arch, e))
}

/// A 30 s, 300 Hz test signal: a 1.2 Hz "heartbeat" with a slower baseline wander.
fn synthetic_signal() -> Vec<f32> {
    (0..INPUT_LENGTH)
        .map(|i| {
            let t = i as f32 / 300.0;
            (2.0 * std::f32::consts::PI * 1.2 * t).sin().powi(15)
                + 0.1 * (2.0 * std::f32::consts::PI * 0.2 * t).sin()
        })
        .collect()
}

fn shapes_of(model: &Model, kind: &str) -> Vec<Shape> {
    model
        .nodes()
        .iter()
        .filter(|n| n.kind() == kind)
        .map(|n| n.shape().clone())
        .collect()
}

// ============================================================================
// Shape Contract Tests
// ============================================================================

mod shape_contract_tests {
    use super::*;

    #[test]
    fn test_all_input_and_output_shapes() {
        for arch in Architecture::ALL {
            let model = build(arch);
            assert_eq!(model.input_shape(), &Shape::sequence(9000, 1), "{}", arch);
            assert_eq!(model.output_shape(), &Shape::flat(3), "{}", arch);
            assert_eq!(model.name(), arch.to_string());
        }
    }

    #[test]
    fn test_merge_inputs_compatible() {
        for arch in Architecture::ALL {
            let model = build(arch);
            for node in model.nodes() {
                let inputs: Vec<&Shape> = node
                    .inputs()
                    .iter()
                    .map(|&t| model.node(t).expect("input node").shape())
                    .collect();
                match node.kind() {
                    "add" => assert!(
                        inputs.iter().all(|s| *s == inputs[0]),
                        "{}: add of {:?}",
                        arch,
                        inputs
                    ),
                    "multiply" => assert!(
                        inputs[1..].iter().all(|s| inputs[0].broadcast(s).is_some()),
                        "{}: multiply of {:?}",
                        arch,
                        inputs
                    ),
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn test_models_are_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Model>();
    }
}

// ============================================================================
// Per-Architecture Topology Tests
// ============================================================================

mod topology_tests {
    use super::*;

    #[test]
    fn test_wdcnn_stage_lengths() {
        let model = build(Architecture::Wdcnn);
        assert_eq!(
            shapes_of(&model, "max_pool1d"),
            vec![
                Shape::sequence(2250, 16),
                Shape::sequence(562, 32),
                Shape::sequence(281, 64),
                Shape::sequence(140, 64),
                Shape::sequence(70, 128),
                Shape::sequence(35, 128),
            ]
        );
        assert_eq!(shapes_of(&model, "flatten"), vec![Shape::flat(4480)]);
    }

    #[test]
    fn test_wdcnn_parameter_count() {
        // trainable parameters: 6 conv + 6 batch norm (gamma, beta) + 2 dense
        assert_eq!(build(Architecture::Wdcnn).parameter_count(), 587_427);
    }

    #[test]
    fn test_vgg12_parameter_count() {
        let model = build(Architecture::Vgg12);
        assert_eq!(shapes_of(&model, "conv1d").len(), 10);
        assert_eq!(shapes_of(&model, "flatten"), vec![Shape::flat(17920)]);
        assert_eq!(model.parameter_count(), 10_612_299);
    }

    #[test]
    fn test_rta_cnn_single_length_correction() {
        let model = build(Architecture::RtaCnn);
        // only the block running at length 281 pools and up-samples to 280
        assert_eq!(
            shapes_of(&model, "zero_padding1d"),
            vec![Shape::sequence(282, 64)]
        );
        assert_eq!(
            shapes_of(&model, "cropping1d"),
            vec![Shape::sequence(281, 64)]
        );
        assert_eq!(shapes_of(&model, "multiply").len(), 6);
        assert_eq!(shapes_of(&model, "dropout").len(), 4);
        assert_eq!(shapes_of(&model, "flatten"), vec![Shape::flat(4480)]);
    }

    #[test]
    fn test_rta_cnn_gates_match_trunk() {
        let model = build(Architecture::RtaCnn);
        let expected = [
            Shape::sequence(9000, 16),
            Shape::sequence(2250, 32),
            Shape::sequence(562, 64),
            Shape::sequence(281, 64),
            Shape::sequence(140, 128),
            Shape::sequence(70, 128),
        ];
        assert_eq!(shapes_of(&model, "multiply"), expected.to_vec());
    }

    #[test]
    fn test_resnet50_lengths() {
        let model = build(Architecture::Resnet50);
        let conv_shapes = shapes_of(&model, "conv1d");
        assert_eq!(conv_shapes[0], Shape::sequence(4497, 64));
        assert_eq!(
            shapes_of(&model, "max_pool1d"),
            vec![Shape::sequence(2248, 64)]
        );
        // stem + 4 projection blocks of 4 convs + 12 identity blocks of 3 convs
        assert_eq!(conv_shapes.len(), 1 + 4 * 4 + 12 * 3);

        let stage_ends: Vec<Shape> = shapes_of(&model, "add")
            .into_iter()
            .fold(Vec::new(), |mut acc, s| {
                if acc.last() != Some(&s) {
                    acc.push(s);
                }
                acc
            });
        assert_eq!(
            stage_ends,
            vec![
                Shape::sequence(562, 256),
                Shape::sequence(141, 512),
                Shape::sequence(71, 1024),
                Shape::sequence(36, 2048),
            ]
        );
        assert_eq!(
            shapes_of(&model, "global_average_pool1d"),
            vec![Shape::flat(2048)]
        );
    }

    #[test]
    fn test_mscnn_towers() {
        let model = build(Architecture::Mscnn);
        let pools = shapes_of(&model, "max_pool1d");
        let tower = vec![
            Shape::sequence(3000, 64),
            Shape::sequence(1000, 128),
            Shape::sequence(500, 256),
            Shape::sequence(250, 512),
            Shape::sequence(125, 512),
        ];
        assert_eq!(pools[..5], tower[..]);
        assert_eq!(pools[5..], tower[..]);
        assert_eq!(
            shapes_of(&model, "concatenate"),
            vec![Shape::sequence(125, 1024)]
        );
        assert_eq!(shapes_of(&model, "flatten"), vec![Shape::flat(128_000)]);
    }

    #[test]
    fn test_senet_excitation_shapes() {
        let model = build(Architecture::Senet);
        assert_eq!(
            shapes_of(&model, "reshape"),
            [16, 32, 64, 64, 128, 128]
                .iter()
                .map(|&f| Shape::sequence(1, f))
                .collect::<Vec<_>>()
        );
        assert_eq!(shapes_of(&model, "global_average_pool1d").len(), 6);
    }
}

// ============================================================================
// Forward Pass Tests
// ============================================================================

mod forward_tests {
    use super::*;

    #[test]
    fn test_every_architecture_outputs_probabilities() {
        let signal = synthetic_signal();
        for arch in Architecture::ALL {
            let model = build(arch);
            let probs = model.predict(&signal, 1).unwrap();
            assert_eq!(probs.len(), 3, "{}", arch);
            assert!(probs.iter().all(|&p| p >= 0.0), "{}: {:?}", arch, probs);
            assert_abs_diff_eq!(probs.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_batch_of_two() {
        let model = build(Architecture::Wdcnn);
        let signal = synthetic_signal();
        let flipped: Vec<f32> = signal.iter().map(|v| -v).collect();
        let batch = [signal.clone(), flipped.clone()].concat();

        let probs = model.predict(&batch, 2).unwrap();
        assert_eq!(probs.len(), 6);
        let first = model.predict(&signal, 1).unwrap();
        let second = model.predict(&flipped, 1).unwrap();
        for (a, b) in probs.iter().zip(first.iter().chain(second.iter())) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_seed_determines_weights() {
        let signal = synthetic_signal();
        let a = Architecture::Senet.build_with_seed(7).unwrap();
        let b = Architecture::Senet.build_with_seed(7).unwrap();
        let c = Architecture::Senet.build_with_seed(8).unwrap();
        let pa = a.predict(&signal, 1).unwrap();
        assert_eq!(pa, b.predict(&signal, 1).unwrap());
        assert_ne!(pa, c.predict(&signal, 1).unwrap());
    }

    #[test]
    fn test_inference_ignores_dropout() {
        let model = build(Architecture::RtaCnn);
        let signal = synthetic_signal();
        assert_eq!(
            model.predict(&signal, 1).unwrap(),
            model.predict(&signal, 1).unwrap()
        );
    }
}
