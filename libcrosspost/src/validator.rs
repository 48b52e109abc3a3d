//! Content-policy validation
//!
//! Pure checks of a canonical post against each platform's content rules.
//! Violations accumulate across all requested platforms; nothing here does
//! I/O or short-circuits. TikTok and YouTube have no content-length rule at
//! this layer; their media-type requirements live in their connectors.

use crate::types::{Platform, SocialPost, ValidationResult, Violation};

pub const TWITTER_MAX_CHARS: usize = 280;
pub const INSTAGRAM_MAX_CHARS: usize = 2200;
pub const LINKEDIN_MAX_CHARS: usize = 3000;
pub const FACEBOOK_MAX_CHARS: usize = 63206;

/// Validate a post against the content rules of every platform it targets.
pub fn validate_post(post: &SocialPost) -> ValidationResult {
    let mut violations = Vec::new();
    for platform in &post.platforms {
        violations.extend(validate_for_platform(post, *platform));
    }
    ValidationResult::from_violations(violations)
}

/// Validate a post against one platform's content rules.
///
/// Character counts are Unicode scalar counts, not byte lengths.
pub fn validate_for_platform(post: &SocialPost, platform: Platform) -> Vec<Violation> {
    let mut violations = Vec::new();
    let char_count = post.content.chars().count();

    match platform {
        Platform::Twitter => {
            if char_count > TWITTER_MAX_CHARS {
                violations.push(Violation {
                    platform,
                    field: "content".to_string(),
                    message: format!(
                        "Twitter posts must be {} characters or less",
                        TWITTER_MAX_CHARS
                    ),
                });
            }
        }
        Platform::Instagram => {
            if post.media.is_empty() {
                violations.push(Violation {
                    platform,
                    field: "media".to_string(),
                    message: "Instagram posts require at least one image or video".to_string(),
                });
            }
            if char_count > INSTAGRAM_MAX_CHARS {
                violations.push(Violation {
                    platform,
                    field: "content".to_string(),
                    message: format!(
                        "Instagram captions must be {} characters or less",
                        INSTAGRAM_MAX_CHARS
                    ),
                });
            }
        }
        Platform::Linkedin => {
            if char_count > LINKEDIN_MAX_CHARS {
                violations.push(Violation {
                    platform,
                    field: "content".to_string(),
                    message: format!(
                        "LinkedIn posts must be {} characters or less",
                        LINKEDIN_MAX_CHARS
                    ),
                });
            }
        }
        Platform::Facebook => {
            if char_count > FACEBOOK_MAX_CHARS {
                violations.push(Violation {
                    platform,
                    field: "content".to_string(),
                    message: format!(
                        "Facebook posts must be {} characters or less",
                        FACEBOOK_MAX_CHARS
                    ),
                });
            }
        }
        Platform::Tiktok | Platform::Youtube => {}
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MediaRef;

    fn post_with(content: &str, platforms: Vec<Platform>) -> SocialPost {
        let mut post = SocialPost::new("title", content);
        post.platforms = platforms;
        post
    }

    #[test]
    fn test_twitter_at_limit_passes() {
        let post = post_with(&"a".repeat(280), vec![Platform::Twitter]);
        let result = validate_post(&post);
        assert!(result.valid);
        assert!(result.violations.is_empty());
    }

    #[test]
    fn test_twitter_over_limit_single_violation() {
        let post = post_with(&"a".repeat(281), vec![Platform::Twitter]);
        let result = validate_post(&post);
        assert!(!result.valid);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].platform, Platform::Twitter);
        assert_eq!(result.violations[0].field, "content");
    }

    #[test]
    fn test_twitter_counts_chars_not_bytes() {
        // 280 multibyte characters stay within the limit
        let post = post_with(&"é".repeat(280), vec![Platform::Twitter]);
        assert!(validate_post(&post).valid);
    }

    #[test]
    fn test_instagram_requires_media_regardless_of_length() {
        let post = post_with("short", vec![Platform::Instagram]);
        let result = validate_post(&post);
        assert!(!result.valid);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].field, "media");
    }

    #[test]
    fn test_instagram_with_media_and_long_caption() {
        let mut post = post_with(&"a".repeat(2201), vec![Platform::Instagram]);
        post.media.push(MediaRef::new("image/jpeg", "/uploads/a.jpg"));
        let result = validate_post(&post);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].field, "content");
    }

    #[test]
    fn test_instagram_both_violations_accumulate() {
        let post = post_with(&"a".repeat(2201), vec![Platform::Instagram]);
        let result = validate_post(&post);
        assert_eq!(result.violations.len(), 2);
    }

    #[test]
    fn test_linkedin_limit() {
        let ok = post_with(&"a".repeat(3000), vec![Platform::Linkedin]);
        assert!(validate_post(&ok).valid);

        let bad = post_with(&"a".repeat(3001), vec![Platform::Linkedin]);
        let result = validate_post(&bad);
        assert_eq!(result.violations[0].platform, Platform::Linkedin);
    }

    #[test]
    fn test_facebook_limit() {
        let ok = post_with(&"a".repeat(63206), vec![Platform::Facebook]);
        assert!(validate_post(&ok).valid);

        let bad = post_with(&"a".repeat(63207), vec![Platform::Facebook]);
        assert!(!validate_post(&bad).valid);
    }

    #[test]
    fn test_tiktok_and_youtube_have_no_content_rule() {
        let post = post_with(
            &"a".repeat(100_000),
            vec![Platform::Tiktok, Platform::Youtube],
        );
        assert!(validate_post(&post).valid);
    }

    #[test]
    fn test_violations_do_not_short_circuit_across_platforms() {
        let post = post_with(
            &"a".repeat(3001),
            vec![Platform::Twitter, Platform::Linkedin, Platform::Instagram],
        );
        let result = validate_post(&post);
        // twitter content, linkedin content, instagram media + content
        assert_eq!(result.violations.len(), 4);
        let platforms: Vec<_> = result.violations.iter().map(|v| v.platform).collect();
        assert!(platforms.contains(&Platform::Twitter));
        assert!(platforms.contains(&Platform::Linkedin));
        assert!(platforms.contains(&Platform::Instagram));
    }

    #[test]
    fn test_empty_platform_set_is_valid() {
        let post = post_with("anything", vec![]);
        assert!(validate_post(&post).valid);
    }
}
