use std::collections::BTreeSet;
use std::sync::Mutex;

/// Hands out data-connection listening ports for passive mode.
///
/// All sessions share one allocator, so it locks internally. Allocation
/// picks the lowest free port to keep behavior deterministic.
pub struct PortAllocator {
    free: Mutex<BTreeSet<u16>>,
}

impl PortAllocator {
    pub fn new(min: u16, max: u16) -> Self {
        PortAllocator {
            free: Mutex::new((min..=max).collect()),
        }
    }

    /// Reserves a free port, or `None` if the range is exhausted.
    pub fn allocate(&self) -> Option<u16> {
        let mut free = self.free.lock().unwrap();
        let port = free.iter().next().copied()?;
        free.remove(&port);
        Some(port)
    }

    /// Returns a port to the pool. Also called when a bind on the port
    /// failed downstream.
    pub fn release(&self, port: u16) {
        self.free.lock().unwrap().insert(port);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_lowest_first() {
        let ports = PortAllocator::new(63700, 63702);
        assert_eq!(ports.allocate(), Some(63700));
        assert_eq!(ports.allocate(), Some(63701));
        assert_eq!(ports.allocate(), Some(63702));
        assert_eq!(ports.allocate(), None);
    }

    #[test]
    fn release_restores_state() {
        let ports = PortAllocator::new(63700, 63701);
        let p = ports.allocate().unwrap();
        ports.release(p);
        assert_eq!(ports.allocate(), Some(p));
    }

    #[test]
    fn concurrent_allocation_is_unique() {
        use std::sync::Arc;

        let ports = Arc::new(PortAllocator::new(63700, 63799));
        let mut handles = Vec::new();
        for _ in 0..10 {
            let ports = Arc::clone(&ports);
            handles.push(std::thread::spawn(move || {
                (0..10).filter_map(|_| ports.allocate()).collect::<Vec<_>>()
            }));
        }

        let mut seen = std::collections::HashSet::new();
        for h in handles {
            for p in h.join().unwrap() {
                assert!(seen.insert(p), "port {} allocated twice", p);
            }
        }
        assert_eq!(seen.len(), 100);
        assert_eq!(ports.allocate(), None);
    }
}
