//! Spatial index behaviour under churn: results must not depend on the
//! bucket size, and must always agree with a linear scan.

use std::collections::BTreeMap;

use flowcrowd::crowd::{FixedNum, FixedVec2, SpatialHash};

fn random_pos(rng: &mut fastrand::Rng) -> FixedVec2 {
    FixedVec2::from_f32(rng.f32() * 80.0 - 40.0, rng.f32() * 80.0 - 40.0)
}

fn sorted(set: impl IntoIterator<Item = u32>) -> Vec<u32> {
    let mut v: Vec<u32> = set.into_iter().collect();
    v.sort_unstable();
    v
}

#[test]
fn test_bucket_size_does_not_change_results() {
    let mut rng = fastrand::Rng::with_seed(2024);
    let sizes = [0.5_f32, 2.0, 7.5, 64.0];
    let mut hashes: Vec<SpatialHash<u32>> =
        sizes.iter().map(|&s| SpatialHash::new(FixedNum::from_num(s))).collect();
    let mut truth: BTreeMap<u32, FixedVec2> = BTreeMap::new();

    for round in 0..400 {
        let id = rng.u32(0..120);
        match rng.u8(0..4) {
            0 => {
                for h in &mut hashes {
                    h.remove(id);
                }
                truth.remove(&id);
            }
            1 if truth.contains_key(&id) => {
                // Small step, often staying in the same bucket.
                let old = truth[&id];
                let new = old + FixedVec2::from_f32(rng.f32() - 0.5, rng.f32() - 0.5);
                for h in &mut hashes {
                    h.update(id, new);
                }
                truth.insert(id, new);
            }
            _ => {
                let pos = random_pos(&mut rng);
                for h in &mut hashes {
                    h.insert(id, pos);
                }
                truth.insert(id, pos);
            }
        }

        if round % 10 == 0 {
            let center = random_pos(&mut rng);
            let radius = FixedNum::from_num(rng.f32() * 20.0);
            let expected = sorted(
                truth
                    .iter()
                    .filter(|(_, p)| (**p - center).length_squared() <= radius * radius)
                    .map(|(&id, _)| id),
            );
            for (h, size) in hashes.iter().zip(sizes) {
                assert_eq!(h.len(), truth.len());
                assert_eq!(sorted(h.query_nearby(center, radius)), expected, "bucket size {size}");
            }
        }
    }
}

#[test]
fn test_positions_far_from_origin() {
    let mut hash = SpatialHash::new(FixedNum::from_num(10));
    let far = FixedVec2::from_f32(-1.0e6, 2.5e6);
    hash.insert(7_u32, far);
    hash.insert(8_u32, far + FixedVec2::from_f32(3.0, 4.0));

    let mut out = Vec::new();
    hash.query_nearby_into(far, FixedNum::from_num(5), Some(7), &mut out);
    assert_eq!(out, vec![8]);

    hash.update(8, FixedVec2::ZERO);
    hash.query_nearby_into(far, FixedNum::from_num(5), Some(7), &mut out);
    assert!(out.is_empty());
    assert_eq!(hash.bucket_count(), 2);
}
