/// Round-robin schedule spreading chunk updates over several ticks.
///
/// With stride `k`, tick `t` updates the chunks whose index is congruent to
/// `t` modulo `k`. A stride of 1 updates every chunk every tick.
#[derive(Debug, Clone)]
pub struct StreamingPolicy {
    chunk_stride: usize,
    tick: u64,
}

impl Default for StreamingPolicy {
    fn default() -> Self {
        Self::new(1)
    }
}

impl StreamingPolicy {
    pub fn new(chunk_stride: usize) -> Self {
        Self {
            chunk_stride: chunk_stride.max(1),
            tick: 0,
        }
    }

    pub fn chunk_stride(&self) -> usize {
        self.chunk_stride
    }

    /// Start the next tick and return its phase.
    pub fn update(&mut self) -> usize {
        let phase = (self.tick % self.chunk_stride as u64) as usize;
        self.tick += 1;
        phase
    }

    pub fn is_scheduled(&self, index: usize, phase: usize) -> bool {
        index % self.chunk_stride == phase
    }
}
