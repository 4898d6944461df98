//! Animation-library and technology detection over fetched content.

use regex::RegexBuilder;

/// A positive animation-library match with its confidence score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationMatch {
    pub library: String,
    pub confidence: u8,
}

/// Signature patterns ordered from most to least specific.
const ANIMATION_PATTERNS: &[(&str, &str, u8)] = &[
    (r"new THREE\.|THREE\.Scene|THREE\.WebGLRenderer", "Three.js", 95),
    (r"gsap|tweenmax|tweenlite|timelinemax|timelinelite", "GSAP", 90),
    (r"lottie|bodymovin", "Lottie", 90),
    (r"anime\(|anime\.js", "Anime.js", 85),
    (r"framer-motion|motion\.", "Framer Motion", 85),
    (r"aos\.init|AOS\.", "AOS", 80),
    (r"scrollmagic", "ScrollMagic", 80),
    (r"@keyframes|animation:|transform:|transition:", "CSS Animations", 70),
];

/// Scan script content for known animation-library signatures.
pub fn detect_animation_library(content: &str) -> Option<AnimationMatch> {
    for (pattern, library, confidence) in ANIMATION_PATTERNS {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .ok()?;
        if re.is_match(content) {
            return Some(AnimationMatch {
                library: (*library).to_string(),
                confidence: *confidence,
            });
        }
    }
    None
}

/// Flag external resource URLs that look CDN-hosted.
pub fn is_cdn_url(url: &str) -> bool {
    url.contains("cdn") || url.contains("googleapis")
}

/// Infer technology names from aggregate content and detected libraries.
pub fn guess_technologies(
    full_css: &str,
    full_js: &str,
    animation_libraries: &[String],
) -> Vec<String> {
    let mut guesses: Vec<String> = animation_libraries.to_vec();
    if full_css.contains("tailwind") {
        guesses.push("Tailwind CSS".to_string());
    }
    if full_js.contains("react") {
        guesses.push("React".to_string());
    }
    if full_js.contains("vue") {
        guesses.push("Vue.js".to_string());
    }
    guesses.dedup();
    guesses
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_gsap_case_insensitive() {
        let m = detect_animation_library("window.GSAP = gsap.timeline()").unwrap();
        assert_eq!(m.library, "GSAP");
        assert_eq!(m.confidence, 90);
    }

    #[test]
    fn three_js_beats_css_animations() {
        let content = "const scene = new THREE.Scene(); /* transition: all */";
        let m = detect_animation_library(content).unwrap();
        assert_eq!(m.library, "Three.js");
        assert_eq!(m.confidence, 95);
    }

    #[test]
    fn plain_script_is_not_animation() {
        assert!(detect_animation_library("console.log('hello')").is_none());
    }

    #[test]
    fn cdn_flagging() {
        assert!(is_cdn_url("https://cdn.jsdelivr.net/npm/x.js"));
        assert!(is_cdn_url("https://fonts.googleapis.com/css2"));
        assert!(!is_cdn_url("https://example.com/app.js"));
    }

    #[test]
    fn technology_guesses() {
        let guesses = guess_technologies(
            "@import 'tailwindcss'; /* tailwind */",
            "import react from 'react'",
            &["GSAP".to_string()],
        );
        assert_eq!(guesses, vec!["GSAP", "Tailwind CSS", "React"]);
    }
}
