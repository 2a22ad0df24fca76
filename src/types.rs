use rustc_hash::FxHashMap;

pub type HashMap<K, V> = FxHashMap<K, V>;

/// Simulation time in integer clock steps.
pub type Tick = usize;
