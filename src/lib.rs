#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod expansion;
pub mod explore;
pub mod export;
pub mod hierarchy;
pub mod ir;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, WindowConfig, load_config, parse_config};
pub use expansion::ExpansionState;
pub use explore::{
    ClusteredGraph, ExplorationEdge, ExplorationGraph, ExplorationNode, SubgraphCluster,
    VirtualEdge, VirtualKind, VirtualNode, build_exploration_graph, cluster_graph, explore,
};
pub use hierarchy::{ConfigError, HierarchyConfig, ResolvedHierarchy, TierBand, TierInfo};
pub use ir::{GraphData, GraphEdge, GraphNode, IssueState, Priority};
