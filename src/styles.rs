//! Style sheets the controller injects into the page head.
//!
//! Each sheet carries a reserved element id; the controller installs all of
//! them in one step during start-up and never again.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleSheet {
    Loading,
    Notification,
    ScrollButton,
}

impl StyleSheet {
    pub const ALL: [StyleSheet; 3] = [
        StyleSheet::Loading,
        StyleSheet::Notification,
        StyleSheet::ScrollButton,
    ];

    pub fn id(self) -> &'static str {
        match self {
            StyleSheet::Loading => "loading-styles",
            StyleSheet::Notification => "notification-styles",
            StyleSheet::ScrollButton => "scroll-button-styles",
        }
    }

    pub fn css(self) -> &'static str {
        match self {
            StyleSheet::Loading => LOADING_CSS,
            StyleSheet::Notification => NOTIFICATION_CSS,
            StyleSheet::ScrollButton => SCROLL_BUTTON_CSS,
        }
    }
}

const LOADING_CSS: &str = "
.loading-overlay {
    position: fixed;
    top: 0;
    left: 0;
    width: 100%;
    height: 100%;
    background: rgba(0, 0, 0, 0.5);
    display: flex;
    justify-content: center;
    align-items: center;
    z-index: 9999;
}
.loading-spinner {
    background: white;
    padding: 2rem;
    border-radius: 8px;
    text-align: center;
    box-shadow: 0 4px 8px rgba(0,0,0,0.2);
}
.loading-spinner p {
    margin-top: 1rem;
    color: #666;
}
";

const NOTIFICATION_CSS: &str = "
.notification {
    position: fixed;
    top: 20px;
    right: 20px;
    background: white;
    border-left: 4px solid #D32F2F;
    box-shadow: 0 4px 8px rgba(0,0,0,0.2);
    border-radius: 4px;
    padding: 1rem;
    z-index: 10000;
    max-width: 400px;
    animation: slideIn 0.3s ease;
}
.notification-info {
    border-left-color: #2196f3;
}
.notification-error {
    border-left-color: #f44336;
}
.notification-warning {
    border-left-color: #ff9800;
}
.notification-success {
    border-left-color: #4caf50;
}
.notification-content {
    display: flex;
    justify-content: space-between;
    align-items: center;
}
.notification-close {
    background: none;
    border: none;
    font-size: 1.5rem;
    cursor: pointer;
    color: #666;
    margin-left: 1rem;
}
@keyframes slideIn {
    from { transform: translateX(100%); opacity: 0; }
    to { transform: translateX(0); opacity: 1; }
}
";

const SCROLL_BUTTON_CSS: &str = "
.scroll-to-top {
    position: fixed;
    bottom: 20px;
    right: 20px;
    width: 50px;
    height: 50px;
    background: #D32F2F;
    color: white;
    border: none;
    border-radius: 50%;
    cursor: pointer;
    font-size: 1.2rem;
    box-shadow: 0 4px 8px rgba(0,0,0,0.2);
    transition: all 0.3s ease;
    z-index: 1000;
    display: none;
}
.scroll-to-top:hover {
    background: #B71C1C;
    transform: translateY(-2px);
}
.scroll-to-top.show {
    display: flex;
    align-items: center;
    justify-content: center;
}
";

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    #[test]
    fn test_ids_are_distinct() {
        assert!(StyleSheet::ALL.iter().map(|s| s.id()).all_unique());
    }

    #[test]
    fn test_each_kind_has_accent() {
        let css = StyleSheet::Notification.css();
        for kind in ["info", "warning", "error", "success"] {
            assert!(css.contains(&format!(".notification-{kind}")), "{kind}");
        }
    }
}
