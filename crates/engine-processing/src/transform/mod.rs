pub mod assemble;
pub mod audit;
pub mod error;
pub mod flatten;
pub mod normalize;
pub mod pipeline;
pub mod pruner;
pub mod rename;
