//! Generated file contents for resolved plan actions.

use chrono::Utc;
use serde_json::json;

use siteforge_analyze::PageAnalysis;

/// Standard top-level page path when an action names no destination.
pub const DEFAULT_PAGE_PATH: &str = "app/page.tsx";
/// Companion stylesheet written alongside materialized pages.
pub const STYLESHEET_PATH: &str = "app/globals.css";
pub const TAILWIND_CONFIG_PATH: &str = "tailwind.config.js";
pub const POSTCSS_CONFIG_PATH: &str = "postcss.config.js";
/// Summary of the most recent analysis, overwritten by later actions.
pub const DESIGN_SUMMARY_PATH: &str = "design.json";

/// Utility-styling toolchain added whenever an action materializes pages.
pub const STYLING_DEV_DEPENDENCIES: &[(&str, &str)] = &[
    ("tailwindcss", "^3.4.0"),
    ("autoprefixer", "^10.4.0"),
    ("postcss", "^8.4.0"),
];

pub const TAILWIND_CONFIG: &str = r#"/** @type {import('tailwindcss').Config} */
module.exports = {
  content: [
    './pages/**/*.{js,ts,jsx,tsx,mdx}',
    './components/**/*.{js,ts,jsx,tsx,mdx}',
    './app/**/*.{js,ts,jsx,tsx,mdx}',
  ],
  theme: {
    extend: {},
  },
  plugins: [],
}
"#;

pub const POSTCSS_CONFIG: &str = r#"module.exports = {
  plugins: {
    tailwindcss: {},
    autoprefixer: {},
  },
}
"#;

const DEFAULT_STYLESHEET_BODY: &str = r#":root {
  font-family: system-ui, -apple-system, sans-serif;
}

body {
  margin: 0;
}
"#;

/// Page component embedding captured markup. The captured script content is
/// injected into the document at mount time and removed at unmount.
pub fn page_component(html: &str, js: &str) -> String {
    format!(
        r#""use client";

import {{ useEffect }} from "react";

const PAGE_HTML = `{html}`;
const PAGE_SCRIPT = `{js}`;

export default function Page() {{
  useEffect(() => {{
    if (!PAGE_SCRIPT.trim()) {{
      return;
    }}
    const script = document.createElement("script");
    script.textContent = PAGE_SCRIPT;
    document.body.appendChild(script);
    return () => {{
      script.remove();
    }};
  }}, []);

  return <main dangerouslySetInnerHTML={{{{ __html: PAGE_HTML }}}} />;
}}
"#,
        html = escape_template_literal(html),
        js = escape_template_literal(js),
    )
}

/// Captured CSS appended after the base-framework directives; a minimal
/// default when the analysis found no CSS at all.
pub fn stylesheet(css: &str, base_url: &str) -> String {
    let body = if css.trim().is_empty() {
        DEFAULT_STYLESHEET_BODY.to_string()
    } else {
        format!("/* Styles captured from {} */\n{}", base_url, css)
    };

    format!(
        "@tailwind base;\n@tailwind components;\n@tailwind utilities;\n\n{}\n",
        body.trim_end()
    )
}

/// `design.json` summary of an analysis.
pub fn design_summary(analysis: &PageAnalysis) -> String {
    let summary = json!({
        "baseURL": analysis.base_url,
        "title": analysis.title,
        "description": analysis.description,
        "analyzedAt": Utc::now().to_rfc3339(),
    });
    // json! output of string/object values always serializes
    serde_json::to_string_pretty(&summary).unwrap_or_default()
}

/// Escape content for embedding in a JavaScript template literal.
fn escape_template_literal(content: &str) -> String {
    content
        .replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_component_embeds_markup_and_script() {
        let page = page_component("<p>hi</p>", "console.log(1)");
        assert!(page.contains("<p>hi</p>"));
        assert!(page.contains("console.log(1)"));
        assert!(page.contains("useEffect"));
        assert!(page.contains("script.remove()"));
    }

    #[test]
    fn template_literal_escaping() {
        let page = page_component("use `backticks` and ${interpolation}", "a\\b");
        assert!(page.contains("use \\`backticks\\` and \\${interpolation}"));
        assert!(page.contains("a\\\\b"));
    }

    #[test]
    fn stylesheet_appends_captured_css_after_directives() {
        let css = stylesheet("body{color:red}", "https://example.com");
        assert!(css.starts_with("@tailwind base;"));
        assert!(css.contains("body{color:red}"));
        assert!(css.contains("https://example.com"));
    }

    #[test]
    fn empty_css_falls_back_to_default_stylesheet() {
        let css = stylesheet("   ", "https://example.com");
        assert!(css.starts_with("@tailwind base;"));
        assert!(css.contains("font-family"));
        assert!(!css.contains("captured from"));
    }
}
