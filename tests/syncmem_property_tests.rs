use proptest::prelude::*;

use syncmem_tb::{
    Addr, AddrConstraint, HarnessConfig, MemoryModel, Orchestrator, PortInputs, SchedulingMode,
    StimulusVector, VectorGenerator, ADDR_MAX, MEM_DEPTH,
};

/// Build a model with arbitrary prior contents and output register.
fn model_with(contents: &[u8], rd_addr: Addr) -> MemoryModel {
    let mut mem = MemoryModel::new();
    for (a, &value) in Addr::all().zip(contents) {
        mem.load(a, value);
    }
    mem.tick(&PortInputs {
        rd_en: true,
        addr: rd_addr,
        ..Default::default()
    });
    mem
}

fn block_on<F: std::future::Future>(fut: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(fut)
}

// Property test generators

/// Generate a valid 7-bit address
fn address() -> impl Strategy<Value = Addr> {
    (0u8..=ADDR_MAX).prop_map(Addr::from_low_bits)
}

/// Generate prior storage contents
fn contents() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), MEM_DEPTH)
}

fn constraint() -> impl Strategy<Value = AddrConstraint> {
    prop_oneof![
        Just(AddrConstraint::default()),
        address().prop_map(AddrConstraint::Fixed),
        (address(), address()).prop_map(|(a, b)| AddrConstraint::range(a, b)),
        Just(AddrConstraint::Any),
    ]
}

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        /// Property: reset clears storage and output whatever else is driven
        #[test]
        fn prop_reset_clears_everything(
            prior in contents(),
            rd_addr in address(),
            wr_en in any::<bool>(),
            rd_en in any::<bool>(),
            wr_data in any::<u8>(),
            addr in address(),
        ) {
            let mut mem = model_with(&prior, rd_addr);
            let out = mem.tick(&PortInputs { reset: true, wr_en, rd_en, wr_data, addr });

            prop_assert_eq!(out, 0);
            prop_assert_eq!(mem.rd_data(), 0);
            prop_assert_eq!(mem.snapshot(), [0u8; MEM_DEPTH]);
        }

        /// Property: a read on the same edge as a write returns the old value
        #[test]
        fn prop_write_read_same_cycle_returns_old(
            prior in contents(),
            addr in address(),
            w in any::<u8>(),
        ) {
            let mut mem = model_with(&prior, addr);
            let v = mem.peek(addr);
            let out = mem.tick(&PortInputs {
                wr_en: true,
                rd_en: true,
                wr_data: w,
                addr,
                ..Default::default()
            });

            prop_assert_eq!(out, v);
            prop_assert_eq!(mem.peek(addr), w);
        }

        /// Property: a write is visible to any later read of the same address
        #[test]
        fn prop_write_persists_across_cycles(
            prior in contents(),
            addr in address(),
            w in any::<u8>(),
            others in prop::collection::vec((address(), any::<u8>(), any::<bool>()), 0..16),
        ) {
            let mut mem = model_with(&prior, addr);
            mem.tick(&PortInputs { wr_en: true, wr_data: w, addr, ..Default::default() });

            // Unrelated traffic elsewhere
            for (other, data, rd_en) in others {
                if other != addr {
                    mem.tick(&PortInputs { wr_en: true, rd_en, wr_data: data, addr: other, ..Default::default() });
                }
            }

            let out = mem.tick(&PortInputs { rd_en: true, addr, ..Default::default() });
            prop_assert_eq!(out, w);
        }

        /// Property: without reset or rd_en the output register holds
        #[test]
        fn prop_noop_preserves_output(
            prior in contents(),
            rd_addr in address(),
            wr_en in any::<bool>(),
            wr_data in any::<u8>(),
            addr in address(),
        ) {
            let mut mem = model_with(&prior, rd_addr);
            let before = mem.rd_data();
            let out = mem.tick(&PortInputs { wr_en, wr_data, addr, ..Default::default() });
            prop_assert_eq!(out, before);
        }

        /// Property: every generated vector satisfies the constraints
        #[test]
        fn prop_generated_vectors_are_legal(
            seed in any::<u64>(),
            count in 0u64..2000,
            c in constraint(),
        ) {
            let mut n = 0;
            for v in VectorGenerator::seeded(seed, c, count) {
                prop_assert!(c.admits(v.addr()));
                prop_assert!(!v.is_reset() || (!v.wr_en() && !v.rd_en()));
                prop_assert!(v.check(&c).is_ok());
                n += 1;
            }
            prop_assert_eq!(n, count);
        }

        /// Property: the driver applies exactly the generated sequence, in order
        #[test]
        fn prop_channel_keeps_order(
            seed in any::<u64>(),
            cycles in 1u64..300,
            capacity in prop::option::of(1usize..8),
            concurrent in any::<bool>(),
            c in constraint(),
        ) {
            let mut config = HarnessConfig::new()
                .seed(seed)
                .cycles(cycles)
                .addr(c)
                .mode(if concurrent { SchedulingMode::Concurrent } else { SchedulingMode::Sequential });
            if let Some(capacity) = capacity {
                config = config.channel_capacity(capacity);
            }

            let report = block_on(Orchestrator::new(config).run()).unwrap();
            let expected: Vec<StimulusVector> = VectorGenerator::seeded(seed, c, cycles).collect();
            let applied: Vec<StimulusVector> = report.applied_vectors().collect();

            prop_assert_eq!(report.generated, cycles);
            prop_assert_eq!(report.applied, cycles);
            prop_assert_eq!(applied, expected);
        }

        /// Property: the scoreboard never disagrees with the model
        #[test]
        fn prop_random_runs_pass_scoreboard(
            seed in any::<u64>(),
            c in constraint(),
        ) {
            let config = HarnessConfig::new().seed(seed).cycles(200).addr(c);
            let report = block_on(Orchestrator::new(config).run()).unwrap();
            prop_assert!(report.passed(), "mismatches: {:?}", report.mismatches);
        }
    }
}
