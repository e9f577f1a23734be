//! Client-side key routing across cache nodes

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a. Every client process must agree on key placement, so the hash may
/// not depend on per-process seeds.
fn stable_hash(key: &str) -> u64 {
    key.bytes()
        .fold(FNV_OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME))
}

/// Index of the node owning `key`. Without smart routing every key lives on
/// the first node.
pub fn route_key(key: &str, node_count: usize, smart_routing: bool) -> usize {
    if !smart_routing || node_count <= 1 {
        return 0;
    }
    (stable_hash(key) % node_count as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_is_stable_and_in_bounds() {
        for id in 0..500 {
            let key = format!("courses:{}", id);
            let node = route_key(&key, 3, true);
            assert!(node < 3);
            assert_eq!(node, route_key(&key, 3, true));
        }
    }

    #[test]
    fn smart_routing_spreads_keys() {
        let mut used = [false; 3];
        for id in 0..100 {
            used[route_key(&format!("courses:{}", id), 3, true)] = true;
        }
        assert!(used.iter().all(|u| *u));
    }

    #[test]
    fn without_smart_routing_everything_goes_to_first_node() {
        for id in 0..50 {
            assert_eq!(route_key(&format!("courses:{}", id), 4, false), 0);
        }
        assert_eq!(route_key("courses:1", 0, true), 0);
    }
}
