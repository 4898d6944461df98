//! Generation prompt construction.
//!
//! The prompt constrains the model to emit a single JSON plan object and
//! to reuse captured styling instead of generating CSS files. When a
//! design context is available, its markup and CSS are injected so later
//! pages keep visual continuity with the analyzed site.

use regex::Regex;

use siteforge_analyze::PageAnalysis;

/// Caps keep the request payload bounded; captured sites can carry
/// megabytes of CSS.
const HTML_CONTEXT_LIMIT: usize = 15_000;
const CSS_CONTEXT_LIMIT: usize = 20_000;

const BASE_RULES: &str = r#"Generate a complete Next.js application for this request.

You may create any project file: pages under app/, components/, lib/ and
hooks/ utilities, and package.json (only when extra dependencies are
needed).

Never generate CSS files. app/globals.css already exists and is loaded
through app/layout.tsx; use its classes (or Tailwind classes) directly in
your components and never import it yourself.

If you create a package.json with Tailwind, use this shape and also emit
tailwind.config.js and postcss.config.js:

{
  "name": "nextjs-app",
  "private": true,
  "scripts": {
    "dev": "next dev -p 3000 -H 0.0.0.0",
    "build": "next build",
    "start": "next start -p 3000 -H 0.0.0.0"
  },
  "dependencies": {
    "next": "14.2.3",
    "react": "18.2.0",
    "react-dom": "18.2.0"
  },
  "devDependencies": {
    "tailwindcss": "^3.4.0",
    "autoprefixer": "^10.4.0",
    "postcss": "^8.4.0"
  }
}

Keep every file concise and modular; avoid large inline CSS or raw HTML
blocks and keep each file under 50KB."#;

const RESPONSE_FORMAT: &str = r#"Return ONLY a JSON object with this exact structure, nothing else:

{
  "files": { "app/about/page.tsx": "file content", ... },
  "delete": ["path/to/remove.tsx"],
  "dependencies": { "package": "version" },
  "devDependencies": { "package": "version" },
  "commands": ["informational shell commands"]
}

No CSS file may appear under "files"."#;

/// Build the full generation prompt for a user request.
pub fn generation_prompt(user_prompt: &str, design_context: Option<&PageAnalysis>) -> String {
    let mut sections = vec![
        format!("{}\n\nRequest: \"{}\"", BASE_RULES, user_prompt.trim()),
    ];

    if let Some(analysis) = design_context {
        sections.push(design_context_section(analysis));
    }

    sections.push(RESPONSE_FORMAT.to_string());
    sections.join("\n\n")
}

fn design_context_section(analysis: &PageAnalysis) -> String {
    let clean_html = strip_scripts(&analysis.full_html);
    let html = truncate_chars(&clean_html, HTML_CONTEXT_LIMIT);
    let css = truncate_chars(&analysis.full_css, CSS_CONTEXT_LIMIT);

    format!(
        r#"DESIGN CONTEXT — captured from {base}:

Reuse this structure and these exact CSS classes for every page you
generate. All of the CSS below is already present in app/globals.css, so
never regenerate it; reference the classes directly.

=== HTML STRUCTURE (scripts removed) ===
{html}

=== CAPTURED CSS ===
{css}"#,
        base = analysis.base_url,
        html = html,
        css = css,
    )
}

/// Remove script blocks, inline handlers and javascript: URLs before the
/// markup is fed back to the model.
fn strip_scripts(html: &str) -> String {
    let script_re = Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap();
    let handler_re = Regex::new(r#"(?i)\son\w+="[^"]*""#).unwrap();
    let js_url_re = Regex::new(r#"(?i)javascript:[^"']*"#).unwrap();

    let without_scripts = script_re.replace_all(html, "");
    let without_handlers = handler_re.replace_all(&without_scripts, "");
    js_url_re.replace_all(&without_handlers, "").to_string()
}

/// Char-boundary-safe truncation with a marker when content was dropped.
fn truncate_chars(content: &str, limit: usize) -> String {
    if content.chars().count() <= limit {
        return content.to_string();
    }
    let truncated: String = content.chars().take(limit).collect();
    format!("{} ...[truncated]", truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis_with(html: &str, css: &str) -> PageAnalysis {
        PageAnalysis {
            full_html: html.to_string(),
            full_css: css.to_string(),
            ..PageAnalysis::from_markup("https://example.com", "")
        }
    }

    #[test]
    fn prompt_without_context_has_rules_and_format() {
        let prompt = generation_prompt("a landing page", None);
        assert!(prompt.contains("Request: \"a landing page\""));
        assert!(prompt.contains("Return ONLY a JSON object"));
        assert!(!prompt.contains("DESIGN CONTEXT"));
    }

    #[test]
    fn prompt_injects_design_context() {
        let analysis = analysis_with("<div class=\"hero\">x</div>", ".hero{color:red}");
        let prompt = generation_prompt("an about page", Some(&analysis));
        assert!(prompt.contains("DESIGN CONTEXT"));
        assert!(prompt.contains("<div class=\"hero\">x</div>"));
        assert!(prompt.contains(".hero{color:red}"));
    }

    #[test]
    fn scripts_and_handlers_are_stripped() {
        let html = r#"<div onclick="steal()"><script>evil()</script><a href="javascript:run()">x</a></div>"#;
        let stripped = strip_scripts(html);
        assert!(!stripped.contains("script"));
        assert!(!stripped.contains("onclick"));
        assert!(!stripped.contains("javascript:"));
        assert!(stripped.contains("<div"));
    }

    #[test]
    fn oversized_context_is_truncated() {
        let analysis = analysis_with("x", &"a".repeat(CSS_CONTEXT_LIMIT + 100));
        let prompt = generation_prompt("page", Some(&analysis));
        assert!(prompt.contains("...[truncated]"));
    }
}
