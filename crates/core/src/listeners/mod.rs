//! Per-instance bookkeeping of host event listeners.
//!
//! Every listener a carousel asks the host to install is represented by a
//! [`ListenerHandle`] owned by that carousel's [`ListenerRegistry`]. Teardown
//! detaches exactly the handles the instance attached.

use serde::Serialize;

/// Identity of one carousel on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct InstanceId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListenerKind {
    /// Window resize.
    Resize,
    /// Pointer enter and leave on the container.
    Hover,
    /// Touch start, end and cancel on the container.
    Touch,
    /// Click-to-pause on the container.
    Click,
    Keyboard,
    /// Intersection observer on the container.
    Visibility,
    PrevButton,
    NextButton,
    AutoplayButton,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ListenerHandle {
    pub instance: InstanceId,
    pub id: u64,
    pub kind: ListenerKind,
}

#[derive(Debug)]
pub struct ListenerRegistry {
    instance: InstanceId,
    attached: Vec<ListenerHandle>,
    next_id: u64,
}

impl ListenerRegistry {
    pub fn new(instance: InstanceId) -> Self {
        Self {
            instance,
            attached: Vec::new(),
            next_id: 1,
        }
    }

    pub fn attach(&mut self, kind: ListenerKind) -> ListenerHandle {
        let handle = ListenerHandle {
            instance: self.instance,
            id: self.next_id,
            kind,
        };
        self.next_id += 1;
        self.attached.push(handle);
        handle
    }

    /// Detaches a handle owned by this registry. Foreign or already detached
    /// handles are ignored.
    pub fn detach(&mut self, handle: ListenerHandle) -> bool {
        let before = self.attached.len();
        self.attached.retain(|attached| *attached != handle);
        before != self.attached.len()
    }

    /// Detaches everything, returning the handles in attach order.
    pub fn detach_all(&mut self) -> Vec<ListenerHandle> {
        std::mem::take(&mut self.attached)
    }

    pub fn is_attached(&self, kind: ListenerKind) -> bool {
        self.attached.iter().any(|handle| handle.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.attached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detaches_only_owned_handles() {
        let mut first = ListenerRegistry::new(InstanceId(1));
        let mut second = ListenerRegistry::new(InstanceId(2));

        let resize = first.attach(ListenerKind::Resize);
        let other = second.attach(ListenerKind::Resize);

        assert!(!first.detach(other));
        assert!(second.is_attached(ListenerKind::Resize));
        assert!(first.detach(resize));
        assert!(!first.detach(resize));
        assert!(first.is_empty());
    }

    #[test]
    fn detach_all_empties_the_registry() {
        let mut registry = ListenerRegistry::new(InstanceId(7));
        registry.attach(ListenerKind::Hover);
        registry.attach(ListenerKind::Touch);

        let detached = registry.detach_all();
        assert_eq!(detached.len(), 2);
        assert_eq!(detached[0].kind, ListenerKind::Hover);
        assert!(!registry.is_attached(ListenerKind::Touch));
        assert!(registry.detach_all().is_empty());
    }
}
