//! Lazily-resolved element locators
//!
//! A [`Locator`] is a chain of selector steps. Nothing is looked up when the
//! locator is built; every probe serialises the chain to JSON and resolves it
//! in the page with a small in-page engine, so a locator always reflects the
//! current DOM.

use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, InsertTextParams,
};
use chromiumoxide::layout::Point;
use chromiumoxide::Page;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::config::TimeoutSettings;
use crate::error::{E2eError, E2eResult};
use crate::expect::LocatorAssertions;
use crate::wait::{poll_until, Probe, WaitConfig};

/// ARIA roles understood by the in-page engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Button,
    Link,
    Checkbox,
    Textbox,
    Dialog,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Button => "button",
            Role::Link => "link",
            Role::Checkbox => "checkbox",
            Role::Textbox => "textbox",
            Role::Dialog => "dialog",
        };
        f.write_str(name)
    }
}

/// One step of a locator chain
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selector {
    Css { selector: String },
    Role { role: Role, name: Option<String> },
    HasText { text: String },
    Has { chain: Vec<Selector> },
    Nth { index: i64 },
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Css { selector } => write!(f, "locator({:?})", selector),
            Selector::Role { role, name: Some(name) } => {
                write!(f, "get_by_role({}, name={:?})", role, name)
            }
            Selector::Role { role, name: None } => write!(f, "get_by_role({})", role),
            Selector::HasText { text } => write!(f, "filter(has_text={:?})", text),
            Selector::Has { chain } => write!(f, "filter(has={})", describe_chain(chain)),
            Selector::Nth { index } => write!(f, "nth({})", index),
        }
    }
}

fn describe_chain(chain: &[Selector]) -> String {
    chain
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// Snapshot of what a locator currently resolves to
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ElementState {
    pub count: usize,
    pub visible: bool,
    pub enabled: bool,
    /// Whitespace-normalised text content of the first match
    pub text: Option<String>,
    /// Raw `class` attribute of the first match
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ClickOptions {
    /// Skip visibility/enablement checks and dispatch a DOM click
    pub force: bool,
}

/// Key definitions for `Input.dispatchKeyEvent`
struct KeyDefinition {
    key: &'static str,
    code: &'static str,
    key_code: i64,
    text: Option<&'static str>,
}

fn key_definition(key: &str) -> E2eResult<KeyDefinition> {
    let def = match key {
        "Enter" => KeyDefinition { key: "Enter", code: "Enter", key_code: 13, text: Some("\r") },
        "Tab" => KeyDefinition { key: "Tab", code: "Tab", key_code: 9, text: None },
        "Escape" => KeyDefinition { key: "Escape", code: "Escape", key_code: 27, text: None },
        "Backspace" => KeyDefinition { key: "Backspace", code: "Backspace", key_code: 8, text: None },
        "ArrowDown" => KeyDefinition { key: "ArrowDown", code: "ArrowDown", key_code: 40, text: None },
        "ArrowUp" => KeyDefinition { key: "ArrowUp", code: "ArrowUp", key_code: 38, text: None },
        other => return Err(E2eError::UnsupportedKey(other.to_string())),
    };
    Ok(def)
}

const ENGINE_JS: &str = r#"
const __norm = (s) => (s || '').replace(/\s+/g, ' ').trim();
const __visible = (e) => {
  if (!e || !e.isConnected) return false;
  const st = window.getComputedStyle(e);
  if (st.visibility === 'hidden' || st.display === 'none') return false;
  const r = e.getBoundingClientRect();
  return r.width > 0 && r.height > 0;
};
const __roles = {
  button: 'button, input[type=button], input[type=submit], input[type=reset], [role=button]',
  link: 'a[href], [role=link]',
  checkbox: 'input[type=checkbox], [role=checkbox]',
  textbox: 'input:not([type]), input[type=text], input[type=email], input[type=password], input[type=search], textarea, [role=textbox]',
  dialog: 'dialog, [role=dialog], [role=alertdialog]',
};
const __name = (e) => __norm(e.getAttribute('aria-label') || e.textContent || e.value || e.getAttribute('title'));
const __uniq = (els) => Array.from(new Set(els));
const __resolve = (steps, roots) => steps.reduce((els, step) => {
  switch (step.kind) {
    case 'css':
      return __uniq(els.flatMap((r) => Array.from(r.querySelectorAll(step.selector))));
    case 'role':
      return __uniq(els.flatMap((r) => Array.from(r.querySelectorAll(__roles[step.role]))))
        .filter((e) => __visible(e) && e.getAttribute('aria-hidden') !== 'true')
        .filter((e) => step.name === null || __name(e).toLowerCase().includes(__norm(step.name).toLowerCase()));
    case 'has_text':
      return els.filter((e) => __norm(e.textContent).toLowerCase().includes(__norm(step.text).toLowerCase()));
    case 'has':
      return els.filter((e) => __resolve(step.chain, [e]).length > 0);
    case 'nth': {
      const i = step.index < 0 ? els.length + step.index : step.index;
      return i >= 0 && i < els.length ? [els[i]] : [];
    }
    default:
      throw new Error('unknown selector step: ' + step.kind);
  }
}, roots);
const __single = (els) => {
  if (els.length !== 1) throw new Error('expected exactly one element, found ' + els.length);
  return els[0];
};
"#;

const STATE_OP: &str = r#"
const e = els[0];
return {
  count: els.length,
  visible: __visible(e),
  enabled: !!e && !e.disabled && e.getAttribute('aria-disabled') !== 'true',
  text: e ? __norm(e.textContent) : null,
  class_name: e ? (e.getAttribute('class') || '') : null,
};
"#;

const CENTER_OP: &str = r#"
const e = __single(els);
e.scrollIntoView({ block: 'center', inline: 'center' });
const r = e.getBoundingClientRect();
return { x: r.left + r.width / 2, y: r.top + r.height / 2 };
"#;

const DOM_CLICK_OP: &str = "__single(els).click(); return true;";

const FOCUS_OP: &str = "__single(els).focus(); return true;";

const FOCUS_AND_CLEAR_OP: &str = r#"
const e = __single(els);
e.focus();
if ('value' in e && e.value !== '') {
  e.value = '';
  e.dispatchEvent(new Event('input', { bubbles: true }));
}
return true;
"#;

#[derive(Debug, Deserialize)]
struct CenterPoint {
    x: f64,
    y: f64,
}

/// Element locator bound to a page
#[derive(Clone)]
pub struct Locator {
    page: Page,
    chain: Vec<Selector>,
    timeouts: TimeoutSettings,
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl Locator {
    pub(crate) fn new(page: Page, first: Selector, timeouts: TimeoutSettings) -> Self {
        Self {
            page,
            chain: vec![first],
            timeouts,
        }
    }

    fn push(&self, step: Selector) -> Self {
        let mut chain = self.chain.clone();
        chain.push(step);
        Self {
            page: self.page.clone(),
            chain,
            timeouts: self.timeouts.clone(),
        }
    }

    /// Descendants of each match that satisfy `css`
    pub fn locator(&self, css: &str) -> Self {
        self.push(Selector::Css {
            selector: css.to_string(),
        })
    }

    /// Keep matches whose text contains `text` (case-insensitive)
    pub fn filter_has_text(&self, text: &str) -> Self {
        self.push(Selector::HasText {
            text: text.to_string(),
        })
    }

    /// Keep matches containing a descendant that `inner` resolves to
    pub fn filter_has(&self, inner: &Locator) -> Self {
        self.push(Selector::Has {
            chain: inner.chain.clone(),
        })
    }

    /// The match at `index`; negative indexes count from the end
    pub fn nth(&self, index: i64) -> Self {
        self.push(Selector::Nth { index })
    }

    pub fn describe(&self) -> String {
        describe_chain(&self.chain)
    }

    pub(crate) fn timeouts(&self) -> &TimeoutSettings {
        &self.timeouts
    }

    /// Web-first assertions on this locator
    pub fn expect(&self) -> LocatorAssertions {
        LocatorAssertions::new(self.clone())
    }

    /// Build the in-page script that resolves the chain and runs `op` over `els`
    pub fn script(&self, op: &str) -> E2eResult<String> {
        let chain = serde_json::to_string(&self.chain)?;
        Ok(format!(
            "(() => {{\n{engine}\nconst els = __resolve({chain}, [document]);\n{op}\n}})()",
            engine = ENGINE_JS,
            chain = chain,
            op = op
        ))
    }

    async fn run<T: serde::de::DeserializeOwned>(&self, op: &str) -> E2eResult<T> {
        let script = self.script(op)?;
        let value = self.page.evaluate(script.as_str()).await?.into_value::<T>()?;
        Ok(value)
    }

    /// Current resolution of the locator
    pub async fn state(&self) -> E2eResult<ElementState> {
        self.run(STATE_OP).await
    }

    pub async fn count(&self) -> E2eResult<usize> {
        Ok(self.state().await?.count)
    }

    /// Like [`Locator::state`] but rejects chains matching several elements
    pub async fn strict_state(&self) -> E2eResult<ElementState> {
        let state = self.state().await?;
        if state.count > 1 {
            return Err(E2eError::StrictModeViolation {
                locator: self.describe(),
                count: state.count,
            });
        }
        Ok(state)
    }

    /// Wait until the locator resolves to exactly one element that can receive input
    async fn wait_actionable(&self, force: bool) -> E2eResult<()> {
        let wait = WaitConfig::new(self.timeouts.action(), self.timeouts.poll_interval());
        let expected = if force { "attached" } else { "visible and enabled" };

        poll_until(&self.describe(), expected, wait, move || async move {
            let state = self.strict_state().await?;
            Ok(match state {
                ElementState { count: 0, .. } => Probe::Pending("no element".to_string()),
                _ if force => Probe::Ready(()),
                ElementState { visible: false, .. } => Probe::Pending("hidden".to_string()),
                ElementState { enabled: false, .. } => Probe::Pending("disabled".to_string()),
                _ => Probe::Ready(()),
            })
        })
        .await
    }

    pub async fn click(&self) -> E2eResult<()> {
        self.click_with(ClickOptions::default()).await
    }

    pub async fn click_with(&self, options: ClickOptions) -> E2eResult<()> {
        self.wait_actionable(options.force).await?;
        debug!("click {} (force: {})", self.describe(), options.force);

        if options.force {
            let _: bool = self.run(DOM_CLICK_OP).await?;
        } else {
            let center: CenterPoint = self.run(CENTER_OP).await?;
            self.page.click(Point { x: center.x, y: center.y }).await?;
        }
        Ok(())
    }

    /// Replace the element's value with `value`
    pub async fn fill(&self, value: &str) -> E2eResult<()> {
        self.wait_actionable(false).await?;
        debug!("fill {}", self.describe());

        let _: bool = self.run(FOCUS_AND_CLEAR_OP).await?;
        if !value.is_empty() {
            self.page.execute(InsertTextParams::new(value)).await?;
        }
        Ok(())
    }

    /// Focus the element and press a named key
    pub async fn press(&self, key: &str) -> E2eResult<()> {
        let def = key_definition(key)?;
        self.wait_actionable(false).await?;
        debug!("press {} on {}", key, self.describe());

        let _: bool = self.run(FOCUS_OP).await?;

        let mut down = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyDown)
            .key(def.key)
            .code(def.code)
            .windows_virtual_key_code(def.key_code)
            .native_virtual_key_code(def.key_code);
        if let Some(text) = def.text {
            down = down.text(text);
        }
        let down = down.build().map_err(E2eError::UnsupportedKey)?;

        let up = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyUp)
            .key(def.key)
            .code(def.code)
            .windows_virtual_key_code(def.key_code)
            .native_virtual_key_code(def.key_code)
            .build()
            .map_err(E2eError::UnsupportedKey)?;

        self.page.execute(down).await?;
        self.page.execute(up).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chain_json(chain: &[Selector]) -> serde_json::Value {
        serde_json::to_value(chain).unwrap()
    }

    #[test]
    fn test_selector_chain_serialises_for_engine() {
        let chain = vec![
            Selector::Css {
                selector: "tbody tr".to_string(),
            },
            Selector::Has {
                chain: vec![
                    Selector::Css {
                        selector: "td".to_string(),
                    },
                    Selector::HasText {
                        text: "category+ab12cd34".to_string(),
                    },
                ],
            },
            Selector::Nth { index: -2 },
        ];

        assert_eq!(
            chain_json(&chain),
            json!([
                { "kind": "css", "selector": "tbody tr" },
                { "kind": "has", "chain": [
                    { "kind": "css", "selector": "td" },
                    { "kind": "has_text", "text": "category+ab12cd34" },
                ]},
                { "kind": "nth", "index": -2 },
            ])
        );
    }

    #[test]
    fn test_role_step_serialises_lowercase() {
        let step = Selector::Role {
            role: Role::Button,
            name: Some("Autenticar".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&step).unwrap(),
            json!({ "kind": "role", "role": "button", "name": "Autenticar" })
        );

        let unnamed = Selector::Role {
            role: Role::Dialog,
            name: None,
        };
        assert_eq!(
            serde_json::to_value(&unnamed).unwrap(),
            json!({ "kind": "role", "role": "dialog", "name": null })
        );
    }

    #[test]
    fn test_descriptions_read_like_the_chain() {
        let chain = vec![
            Selector::Css {
                selector: ".page-item".to_string(),
            },
            Selector::Nth { index: -2 },
        ];
        assert_eq!(describe_chain(&chain), r#"locator(".page-item").nth(-2)"#);

        let role = Selector::Role {
            role: Role::Link,
            name: Some("Dashboard".to_string()),
        };
        assert_eq!(role.to_string(), r#"get_by_role(link, name="Dashboard")"#);
    }

    #[test]
    fn test_engine_escapes_selector_text() {
        // Quotes in selectors must survive as JSON string content.
        let chain = vec![Selector::Css {
            selector: r#"input[formcontrolname="email"][type="email"]"#.to_string(),
        }];
        let encoded = serde_json::to_string(&chain).unwrap();
        assert!(encoded.contains(r#"input[formcontrolname=\"email\"][type=\"email\"]"#));
    }

    #[test]
    fn test_element_state_decodes_probe_result() {
        let state: ElementState = serde_json::from_value(json!({
            "count": 1,
            "visible": true,
            "enabled": true,
            "text": "Tipos de Categorias",
            "class_name": "nav-link active",
        }))
        .unwrap();
        assert_eq!(state.count, 1);
        assert_eq!(state.class_name.as_deref(), Some("nav-link active"));

        let empty: ElementState = serde_json::from_value(json!({
            "count": 0,
            "visible": false,
            "enabled": false,
            "text": null,
            "class_name": null,
        }))
        .unwrap();
        assert_eq!(empty, ElementState::default());
    }

    #[test]
    fn test_key_definitions() {
        let enter = key_definition("Enter").unwrap();
        assert_eq!(enter.key_code, 13);
        assert_eq!(enter.text, Some("\r"));
        assert!(matches!(
            key_definition("F13"),
            Err(E2eError::UnsupportedKey(_))
        ));
    }
}
