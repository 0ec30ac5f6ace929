//! Seeded synthetic VSS trees for benches and large-tree tests.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::codec::constants::MAX_CHILDREN;
use crate::codec::{Datatype, NodeKind, NodeRecord, Validate};
use crate::tree::{NodeId, VssTree};

const LEAF_KINDS: [NodeKind; 3] = [NodeKind::Sensor, NodeKind::Actuator, NodeKind::Attribute];
const LEAF_TYPES: [Datatype; 6] = [
    Datatype::Uint8,
    Datatype::Int32,
    Datatype::Float,
    Datatype::Boolean,
    Datatype::String,
    Datatype::Uint16Array,
];

#[derive(Clone, Copy, Debug)]
pub enum TreeShape {
    /// Every node has one child.
    Chain,
    /// Complete tree where each branch has `fanout` children.
    Balanced { fanout: usize },
    /// Each new node picks a random parent that still has room.
    Random { max_children: usize },
}

/// Build a tree of `node_count` nodes. Nodes with children are branches; the
/// rest are leaves with random kinds, datatypes and metadata.
pub fn generate_tree(shape: TreeShape, node_count: usize, seed: u64) -> VssTree {
    assert!(node_count > 0, "node_count must be positive");
    let mut rng = StdRng::seed_from_u64(seed);
    let parents = match shape {
        TreeShape::Chain => (1..node_count).map(|idx| idx - 1).collect(),
        TreeShape::Balanced { fanout } => {
            assert!((1..=MAX_CHILDREN).contains(&fanout), "fanout out of range");
            (1..node_count).map(|idx| (idx - 1) / fanout).collect()
        }
        TreeShape::Random { max_children } => {
            random_parents(&mut rng, node_count, max_children.clamp(1, MAX_CHILDREN))
        }
    };

    let mut child_counts = vec![0usize; node_count];
    for &parent in &parents {
        child_counts[parent] += 1;
    }

    let mut tree = VssTree::with_capacity(
        node_record(&mut rng, "Vehicle".to_string(), child_counts[0] > 0, 0),
        node_count,
    );
    let mut ids: Vec<NodeId> = Vec::with_capacity(node_count);
    ids.push(tree.root());
    let mut next_index = vec![0usize; node_count];
    for (offset, &parent) in parents.iter().enumerate() {
        let idx = offset + 1;
        let name = format!("N{}", next_index[parent]);
        next_index[parent] += 1;
        let record = node_record(&mut rng, name, child_counts[idx] > 0, idx);
        ids.push(tree.push_child(ids[parent], record));
    }
    tree
}

fn random_parents(rng: &mut StdRng, node_count: usize, max_children: usize) -> Vec<usize> {
    let mut open = vec![0usize];
    let mut counts = vec![0usize; node_count];
    let mut parents = Vec::with_capacity(node_count.saturating_sub(1));
    for idx in 1..node_count {
        let slot = rng.gen_range(0..open.len());
        let parent = open[slot];
        parents.push(parent);
        counts[parent] += 1;
        if counts[parent] == max_children {
            open.swap_remove(slot);
        }
        open.push(idx);
    }
    parents
}

fn node_record(rng: &mut StdRng, name: String, is_branch: bool, idx: usize) -> NodeRecord {
    let uuid = format!("{:032x}", rng.r#gen::<u128>());
    if is_branch {
        return NodeRecord::branch(name)
            .with_uuid(uuid)
            .with_description(format!("Branch {idx}"));
    }
    let kind = LEAF_KINDS[rng.gen_range(0..LEAF_KINDS.len())];
    let datatype = LEAF_TYPES[rng.gen_range(0..LEAF_TYPES.len())];
    let mut record = NodeRecord::leaf(name, kind, datatype)
        .with_uuid(uuid)
        .with_description(format!("Signal {idx}"));
    if datatype == Datatype::String && rng.gen_bool(0.5) {
        record = record
            .with_allowed(["OFF", "LOW", "HIGH"])
            .with_default("OFF");
    } else if datatype != Datatype::Boolean {
        record = record
            .with_bounds("0", rng.gen_range(1..=250).to_string())
            .with_unit("km/h");
    }
    if kind == NodeKind::Actuator {
        record = record.with_validate(Validate::ReadWrite);
    }
    record
}
