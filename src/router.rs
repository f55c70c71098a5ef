// src/router.rs
//
// View lifecycle. Views register once and are activated by name; exactly
// one is active at a time and carries the nav marker. Activation mounts
// the incoming view before unmounting the outgoing one, so a mount
// failure leaves the previous view fully intact.

use anyhow::{Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Live,
    Analytics,
}

impl ViewKind {
    pub fn title(self) -> &'static str {
        match self {
            ViewKind::Live => "Live Traffic",
            ViewKind::Analytics => "Analytics",
        }
    }
}

/// A registered view. `mount` acquires the view's live resources (poll
/// loops); `unmount` releases them and must leave the view re-mountable.
pub trait View {
    fn kind(&self) -> ViewKind;
    fn mount(&mut self) -> Result<()>;
    fn unmount(&mut self);
}

pub struct ViewRouter<V: View> {
    views: Vec<V>,
    active: Option<usize>,
}

impl<V: View> ViewRouter<V> {
    pub fn new(views: Vec<V>) -> Self {
        Self { views, active: None }
    }

    pub fn kinds(&self) -> impl Iterator<Item = ViewKind> + '_ {
        self.views.iter().map(|v| v.kind())
    }

    pub fn active_kind(&self) -> Option<ViewKind> {
        self.active.map(|i| self.views[i].kind())
    }

    pub fn active_view(&self) -> Option<&V> {
        self.active.map(|i| &self.views[i])
    }

    pub fn active_view_mut(&mut self) -> Option<&mut V> {
        self.active.map(move |i| &mut self.views[i])
    }

    /// Make `kind` the active view. No-op when already active. On mount
    /// failure the previously active view stays mounted and marked.
    pub fn activate(&mut self, kind: ViewKind) -> Result<()> {
        if self.active_kind() == Some(kind) {
            return Ok(());
        }
        let idx = self
            .views
            .iter()
            .position(|v| v.kind() == kind)
            .with_context(|| format!("no registered view for {:?}", kind))?;

        self.views[idx].mount()?;

        if let Some(prev) = self.active.take() {
            self.views[prev].unmount();
        }
        self.active = Some(idx);
        Ok(())
    }

    /// The next registered view after the active one, for tab cycling.
    pub fn next_kind(&self) -> Option<ViewKind> {
        if self.views.is_empty() {
            return None;
        }
        let next = match self.active {
            Some(i) => (i + 1) % self.views.len(),
            None => 0,
        };
        Some(self.views[next].kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    struct MockView {
        kind: ViewKind,
        fail_mount: bool,
        mounted: bool,
        mounts: usize,
        unmounts: usize,
    }

    impl MockView {
        fn new(kind: ViewKind) -> Self {
            Self { kind, fail_mount: false, mounted: false, mounts: 0, unmounts: 0 }
        }
    }

    impl View for MockView {
        fn kind(&self) -> ViewKind {
            self.kind
        }

        fn mount(&mut self) -> Result<()> {
            if self.fail_mount {
                bail!("mount refused");
            }
            self.mounted = true;
            self.mounts += 1;
            Ok(())
        }

        fn unmount(&mut self) {
            self.mounted = false;
            self.unmounts += 1;
        }
    }

    fn router() -> ViewRouter<MockView> {
        ViewRouter::new(vec![
            MockView::new(ViewKind::Live),
            MockView::new(ViewKind::Analytics),
        ])
    }

    #[test]
    fn test_exactly_one_active_after_switches() {
        let mut router = router();
        router.activate(ViewKind::Live).unwrap();
        assert_eq!(router.active_kind(), Some(ViewKind::Live));

        router.activate(ViewKind::Analytics).unwrap();
        assert_eq!(router.active_kind(), Some(ViewKind::Analytics));

        let mounted: Vec<bool> = router.views.iter().map(|v| v.mounted).collect();
        assert_eq!(mounted, vec![false, true]);
        assert_eq!(router.views[0].unmounts, 1);
    }

    #[test]
    fn test_reactivating_active_view_is_a_noop() {
        let mut router = router();
        router.activate(ViewKind::Live).unwrap();
        router.activate(ViewKind::Live).unwrap();
        assert_eq!(router.views[0].mounts, 1);
        assert_eq!(router.views[0].unmounts, 0);
    }

    #[test]
    fn test_mount_failure_keeps_previous_view() {
        let mut router = router();
        router.activate(ViewKind::Live).unwrap();
        router.views[1].fail_mount = true;

        assert!(router.activate(ViewKind::Analytics).is_err());
        assert_eq!(router.active_kind(), Some(ViewKind::Live));
        assert!(router.views[0].mounted);
        assert_eq!(router.views[0].unmounts, 0);
    }

    #[test]
    fn test_tab_cycling_wraps() {
        let mut router = router();
        assert_eq!(router.next_kind(), Some(ViewKind::Live));
        router.activate(ViewKind::Live).unwrap();
        assert_eq!(router.next_kind(), Some(ViewKind::Analytics));
        router.activate(ViewKind::Analytics).unwrap();
        assert_eq!(router.next_kind(), Some(ViewKind::Live));
    }
}
