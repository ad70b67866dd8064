//! Intranet pages served to the browser window.

use crate::events::UiEvent;
use crate::secret::Secret;

pub const HOME_URL: &str = "local://home";
pub const HASH_TOOL_URL: &str = "local://hash-tool";

const NOT_FOUND: &str = "<h1>404 Not Found</h1>";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub url: String,
    pub content: String,
    pub found: bool,
}

/// Returns the landing page with the mission briefing.
fn home() -> &'static str {
    r#"<h1>Welcome to Intranet</h1>
<p>System status: CRITICAL.</p>
<p>Recovery data has been fragmented across the secure partition.</p>
<p><strong>Mission:</strong> Locate missing hash fragments, recombine them, and restore system access.</p>
<hr>
<h3>Updates</h3>
<p>Admin: Please stop leaving half-keys in the build logs. It's a security risk.</p>
"#
}

/// Returns the deprecated project page carrying the first hash fragment.
fn project_alpha(first_half: &str) -> String {
    format!(
        r#"<h1>Project Alpha</h1>
<p>Status: Deprecated.</p>
<p>Codebase moved to legacy storage.</p>
<p>To reference build v4.2, use checksum: <span class="hash-fragment">({first_half})</span></p>
<p>Note: Ensure you verify integrity before deploying.</p>
"#
    )
}

fn hash_tool() -> &'static str {
    r#"<div class="hash-tool-container">
<h1>Cryptographic Decoder</h1>
<p>Enter full hash string to decrypt.</p>
<input type="text" id="hash-tool-input" class="hash-input" placeholder="Paste full hash here...">
<button id="hash-tool-btn" class="primary-btn">DECODE</button>
<div class="progress-bar"><div class="progress-bar-fill"></div></div>
<div class="log-output"></div>
</div>
"#
}

fn dev_log() -> &'static str {
    r#"<h1>Developer Log</h1>
<p>Entry 404: Sleep deprivation kicking in. I hid the other half of the key in the About page alt-text, but then I realized we don't have an About page.</p>
<p>Moved it to the System Administration page footer. Don't tell Dave.</p>
"#
}

/// Returns the admin page; the second fragment hides in the footer.
fn sys_admin(second_half: &str) -> String {
    format!(
        r#"<h1>System Administration</h1>
<p>Authorized personnel only.</p>
<details><summary>Server Config</summary><p>Port: 8080</p><p>Protocol: HTTPS</p></details>
<details><summary>User Management</summary><p>Active Users: 1</p></details>
<div class="build-footer">System Build ID: <span>{second_half}</span></div>
"#
    )
}

fn legacy_docs() -> &'static str {
    r#"<h1>Legacy Documentation</h1>
<p>Lorem ipsum dolor sit amet. NOT A REAL HASH: a1b2c3d4</p>
<p>Do not use old keys. They will fail validation.</p>
<code>HASH_OLD = 8822991100</code>
"#
}

/// Resolve a page. Unknown URLs render a placeholder and never fail.
pub fn get_page(url: &str, secret: &Secret) -> Page {
    let content = match url {
        HOME_URL => Some(home().to_string()),
        "local://project-alpha" => Some(project_alpha(secret.first_half())),
        HASH_TOOL_URL => Some(hash_tool().to_string()),
        "local://dev-log" => Some(dev_log().to_string()),
        "local://sys-admin" => Some(sys_admin(secret.second_half())),
        "local://legacy-docs" => Some(legacy_docs().to_string()),
        _ => None,
    };
    Page {
        url: url.to_string(),
        found: content.is_some(),
        content: content.unwrap_or_else(|| NOT_FOUND.to_string()),
    }
}

/// The browser window's navigation state.
#[derive(Debug)]
pub struct Browser {
    current_url: String,
}

impl Default for Browser {
    fn default() -> Self {
        Self {
            current_url: HOME_URL.to_string(),
        }
    }
}

impl Browser {
    pub fn current_url(&self) -> &str {
        &self.current_url
    }

    /// The decode control only exists while the hash tool is loaded.
    pub fn decode_control_wired(&self) -> bool {
        self.current_url == HASH_TOOL_URL
    }

    pub fn navigate(&mut self, url: &str, secret: &Secret) -> UiEvent {
        let page = get_page(url, secret);
        self.current_url = page.url.clone();
        UiEvent::PageLoaded {
            url: page.url,
            content: page.content,
            found: page.found,
        }
    }
}
