//! Property tests for the stake rule, difficulty encoding and retargeting

use proptest::prelude::*;
use stake_proof::*;
use stake_proof::header::*;
use stake_proof::numeric::*;
use stake_proof::pow::*;
use stake_proof::retarget::*;

/// Any target in [0, MIN_DIFFICULTY]: top byte capped at 0xef
fn target_strategy() -> impl Strategy<Value = U256> {
    any::<[u8; 32]>().prop_map(|mut bytes| {
        bytes[0] %= 0xf0;
        U256::from_big_endian(&bytes)
    })
}

fn header_strategy() -> impl Strategy<Value = BlockHeader> {
    (
        any::<[u8; 32]>(),
        any::<i64>(),
        any::<[u8; 32]>(),
        target_strategy(),
        any::<[u8; 32]>(),
        any::<u64>(),
        any::<[u8; 32]>(),
    )
        .prop_map(|(parent, time, provenance, target, coinbase, stake, merkle_root)| BlockHeader {
            parent,
            time,
            provenance,
            difficulty: int_to_difficulty(target).unwrap(),
            coinbase: hash_to_address(&coinbase),
            stake,
            merkle_root,
        })
}

proptest! {
    #[test]
    fn difficulty_round_trip(target in target_strategy()) {
        let difficulty = int_to_difficulty(target).unwrap();
        prop_assert!(difficulty.is_canonical());
        prop_assert_eq!(difficulty_to_int(&difficulty).unwrap(), target);
    }

    #[test]
    fn required_stake_monotonic_in_difficulty(
        proof in any::<u128>(),
        a in any::<u64>(),
        b in any::<u64>(),
    ) {
        let (harder, easier) = if a <= b { (a, b) } else { (b, a) };
        let proof = U256::from(proof);
        match (required_stake(proof, U256::from(harder)), required_stake(proof, U256::from(easier))) {
            (Ok(high), Ok(low)) => prop_assert!(high >= low),
            (Err(ConsensusError::ArithmeticOverflow), _) => {}
            (Ok(_), Err(e)) => prop_assert!(false, "easier target failed: {:?}", e),
            (Err(e), _) => prop_assert!(false, "unexpected error: {:?}", e),
        }
    }

    #[test]
    fn required_stake_is_minimal(proof in any::<u128>(), target in any::<u64>()) {
        let proof = U256::from(proof);
        let target = U256::from(target);
        if let Ok(stake) = required_stake(proof, target) {
            if stake == 0 {
                prop_assert!(proof <= target);
                prop_assert!(stake_suffices(proof, target, 1).unwrap());
            } else {
                prop_assert!(stake_suffices(proof, target, stake).unwrap());
                if stake > 1 {
                    prop_assert!(!stake_suffices(proof, target, stake - 1).unwrap());
                }
            }
        }
    }

    #[test]
    fn header_minimal_stake_agrees_with_validation(mut header in header_strategy()) {
        header.stake = header.stake.max(1);
        if let Ok(minimal) = minimal_stake(&header) {
            // The header's own stake passes exactly when it reaches the minimum
            prop_assert_eq!(validate_stake(&header).unwrap(), header.stake >= minimal);
        }
    }

    #[test]
    fn zero_stake_always_rejected(mut header in header_strategy()) {
        header.stake = 0;
        prop_assert_eq!(validate_stake(&header), Err(ConsensusError::ZeroStake));
    }

    #[test]
    fn underflow_always_rejected(mut bytes in any::<[u8; 32]>(), high in 0xf0u8..=0xff) {
        bytes[0] = high;
        let difficulty = Difficulty::new(bytes.to_vec());
        prop_assert_eq!(difficulty_to_int(&difficulty), Err(ConsensusError::DifficultyUnderflow));
    }

    #[test]
    fn header_hash_deterministic(header in header_strategy()) {
        let copy = header.clone();
        prop_assert_eq!(header_hash(&header).unwrap(), header_hash(&copy).unwrap());
        let decoded = deserialize_header(&serialize_header(&header).unwrap()).unwrap();
        prop_assert_eq!(header_hash(&decoded).unwrap(), header_hash(&header).unwrap());
    }

    #[test]
    fn header_hash_sensitive_to_stake(header in header_strategy()) {
        let mut other = header.clone();
        other.stake = header.stake.wrapping_add(1);
        prop_assert_ne!(header_hash(&header).unwrap(), header_hash(&other).unwrap());
    }

    #[test]
    fn decoder_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..200)) {
        let _ = deserialize_header(&bytes);
        let _ = deserialize_block(&bytes);
    }

    #[test]
    fn on_target_intervals_are_a_fixed_point(target in target_strategy(), blocks in 1usize..60) {
        let params = ConsensusParameters::default();
        let difficulty = int_to_difficulty(target).unwrap();
        let window: Vec<BlockHeader> = (0..blocks)
            .map(|i| BlockHeader {
                parent: [0; 32],
                time: 1_000 + i as i64 * params.block_interval_target,
                provenance: [0; 32],
                difficulty: difficulty.clone(),
                coinbase: hash_to_address(&[0; 32]),
                stake: 1,
                merkle_root: [0; 32],
            })
            .collect();
        prop_assert_eq!(retarget(&window, &params).unwrap(), difficulty);
    }

    #[test]
    fn slow_tip_near_easiest_is_always_extendable(
        headroom in 0u64..u64::MAX,
        slow in 11i64..10_000,
        next in 1i64..10_000,
    ) {
        let params = ConsensusParameters::default();
        let target = MIN_DIFFICULTY - U256::from(headroom);
        let mut window: Vec<BlockHeader> = Vec::new();
        let mut time = 0i64;
        for interval in [0, slow, next] {
            time += interval;
            let difficulty = match window.len() {
                0 => int_to_difficulty(target).unwrap(),
                _ => retarget(&window, &params).unwrap(),
            };
            window.push(BlockHeader {
                parent: [0; 32],
                time,
                provenance: [0; 32],
                difficulty,
                coinbase: hash_to_address(&[0; 32]),
                stake: 1,
                merkle_root: [0; 32],
            });
        }
        prop_assert!(retarget(&window, &params).is_ok());
    }

    #[test]
    fn retarget_swing_is_bounded(
        target in target_strategy(),
        intervals in prop::collection::vec(1i64..1_000, 1..40),
    ) {
        let params = ConsensusParameters::default();
        let difficulty = int_to_difficulty(target).unwrap();
        let mut time = 0i64;
        let mut window = Vec::new();
        for interval in std::iter::once(0).chain(intervals) {
            time += interval;
            window.push(BlockHeader {
                parent: [0; 32],
                time,
                provenance: [0; 32],
                difficulty: difficulty.clone(),
                coinbase: hash_to_address(&[0; 32]),
                stake: 1,
                merkle_root: [0; 32],
            });
        }

        let bound = target / U256::from(params.adjustment_inverse_base);
        let next = difficulty_to_int(&retarget(&window, &params).unwrap()).unwrap();
        let swing = if next > target { next - target } else { target - next };
        prop_assert!(swing <= bound);
        prop_assert!(next <= MIN_DIFFICULTY);
    }
}
