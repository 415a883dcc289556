//! Scripted user interaction for the headless driver.
//!
//! A scenario is a YAML list of steps run in order against a started
//! controller:
//!
//! ```yaml
//! steps:
//!   - action: change
//!     selector: 'select[name="category"]'
//!     value: "2"
//!   - action: scroll
//!     y: 640
//!   - action: wait
//!     ms: 5000
//!   - action: unload
//! ```

use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::task::yield_now;
use tokio::time::sleep;
use tracing::{debug, info, instrument};

use crate::controller::PageController;
use crate::dom::NodeId;
use crate::error::PageError;
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Click { selector: String },
    Change { selector: String, value: String },
    Input { selector: String, value: String },
    Submit { selector: String },
    Scroll { y: f64 },
    ImageError { selector: String },
    Wait { ms: u64 },
    Unload,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, PageError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, PageError> {
        let raw = fs::read_to_string(path.as_ref()).await?;
        Self::from_yaml_str(&raw)
    }

    /// Run every step, stopping at the first selector that matches nothing.
    #[instrument(level = "info", skip_all, fields(steps = self.steps.len()))]
    pub async fn run<T: Transport + 'static>(
        &self,
        page: &Rc<PageController<T>>,
    ) -> Result<(), PageError> {
        for (index, step) in self.steps.iter().enumerate() {
            debug!(index, ?step, "running scenario step");
            match step {
                Step::Click { selector } => {
                    page.click(locate(page, selector, index)?);
                }
                Step::Change { selector, value } => {
                    page.change(locate(page, selector, index)?, value);
                }
                Step::Input { selector, value } => {
                    page.input(locate(page, selector, index)?, value);
                }
                Step::Submit { selector } => {
                    page.submit(locate(page, selector, index)?);
                }
                Step::Scroll { y } => page.scroll_to(*y),
                Step::ImageError { selector } => {
                    page.image_failed(locate(page, selector, index)?);
                }
                Step::Wait { ms } => sleep(Duration::from_millis(*ms)).await,
                Step::Unload => page.unload(),
            }
            // Give spawned refresh and timer tasks a chance to run.
            yield_now().await;
        }
        info!("scenario finished");
        Ok(())
    }
}

fn locate<T: Transport + 'static>(
    page: &PageController<T>,
    selector: &str,
    step: usize,
) -> Result<NodeId, PageError> {
    page.find(selector)?
        .ok_or_else(|| PageError::NoSuchElement {
            selector: selector.to_string(),
            step,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::NotificationKind;
    use crate::test_support::{Reply, controller, settle};
    use tokio::task::LocalSet;

    #[test]
    fn test_parse_steps() {
        let scenario = Scenario::from_yaml_str(
            r#"
steps:
  - action: input
    selector: 'input[name="keyword"]'
    value: flood
  - action: image_error
    selector: img
  - action: wait
    ms: 250
  - action: unload
"#,
        )
        .unwrap();
        assert_eq!(
            scenario.steps,
            vec![
                Step::Input {
                    selector: r#"input[name="keyword"]"#.to_string(),
                    value: "flood".to_string(),
                },
                Step::ImageError {
                    selector: "img".to_string(),
                },
                Step::Wait { ms: 250 },
                Step::Unload,
            ]
        );
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let err = Scenario::from_yaml_str("steps:\n  - action: hover\n    selector: a\n").unwrap_err();
        assert_eq!(err.error_code(), "page.config_invalid");
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_drives_the_page() {
        LocalSet::new()
            .run_until(async {
                let page = controller(Reply::Fail);
                page.start().unwrap();
                let scenario = Scenario {
                    steps: vec![
                        Step::Click {
                            selector: ".refresh-btn".to_string(),
                        },
                        Step::Scroll { y: 900.0 },
                        Step::Change {
                            selector: r#"select[name="category"]"#.to_string(),
                            value: "2".to_string(),
                        },
                    ],
                };

                scenario.run(&page).await.unwrap();
                settle().await;

                let snapshot = page.snapshot();
                assert_eq!(snapshot.submissions.len(), 1);
                assert!(snapshot.scroll_button_shown);
                assert_eq!(snapshot.notifications[0].kind, NotificationKind::Error);
                assert!(!snapshot.refresh_in_flight);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_lets_timers_fire() {
        LocalSet::new()
            .run_until(async {
                let page = controller(Reply::Succeed);
                page.start().unwrap();
                page.transport().set_reply(Reply::Hold);
                let scenario = Scenario::from_yaml_str(
                    "steps:\n  - action: wait\n    ms: 300001\n",
                )
                .unwrap();

                scenario.run(&page).await.unwrap();
                settle().await;

                assert_eq!(page.transport().calls(), 1);
                assert!(page.is_loading());
                assert!(page.overlay_visible());
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_element_stops_the_run() {
        LocalSet::new()
            .run_until(async {
                let page = controller(Reply::Succeed);
                page.start().unwrap();
                let scenario = Scenario {
                    steps: vec![
                        Step::Scroll { y: 500.0 },
                        Step::Click {
                            selector: ".does-not-exist".to_string(),
                        },
                        Step::Unload,
                    ],
                };

                let err = scenario.run(&page).await.unwrap_err();
                assert!(matches!(err, PageError::NoSuchElement { step: 1, .. }));
                assert!(page.is_auto_refresh_active());
            })
            .await;
    }
}
