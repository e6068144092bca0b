#[derive(Debug, Default, Clone)]
pub struct WorkerStats {
    pub contributions: u64,
    pub units: u64,
}

impl WorkerStats {
    #[inline]
    pub fn bump_contribution(&mut self) {
        self.contributions += 1;
    }

    #[inline]
    pub fn add_units(&mut self, n: usize) {
        self.units += n as u64;
    }
}
