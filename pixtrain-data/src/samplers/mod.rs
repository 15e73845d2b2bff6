pub mod traits;
pub mod sequential_sampler;
pub mod random_sampler;

pub use traits::Sampler;
pub use sequential_sampler::SequentialSampler;
pub use random_sampler::RandomSampler;
