//! Built-in takeover fingerprints
//!
//! Organized by provider; the generic catch-all stays last.

use once_cell::sync::Lazy;
use subtake_common::Fingerprint;

fn lit(service: &str, pattern: &str, notes: &str) -> Fingerprint {
    Fingerprint::literal(service, pattern).with_notes(notes)
}

fn re(service: &str, pattern: &str, notes: &str) -> Fingerprint {
    Fingerprint::regex(service, pattern).with_notes(notes)
}

pub static BUILTIN_FINGERPRINTS: Lazy<Vec<Fingerprint>> = Lazy::new(|| {
    vec![
        // GitHub Pages
        lit(
            "GitHub Pages",
            "There isn't a GitHub Pages site here.",
            "Indicates a CNAME pointing to GitHub Pages without content",
        ),
        re(
            "GitHub Pages",
            "(?i)github pages.*not found|there isn't a github pages site",
            "GitHub Pages error variations",
        ),
        // Vercel
        re(
            "Vercel",
            "(?i)project not found|there isn't a vercel deployment here|no such host",
            "Typical message when alias points to Vercel without deployment",
        ),
        // Netlify
        lit("Netlify", "No such site", "Netlify default page text"),
        lit(
            "Netlify",
            "There isn't a site here",
            "Netlify default page text variation",
        ),
        re(
            "Netlify",
            "(?i)netlify.*not found|404.*netlify",
            "Netlify error with reference in body",
        ),
        // AWS S3
        lit(
            "AWS S3",
            "NoSuchBucket",
            "AWS S3 XML error for non-existent bucket",
        ),
        lit(
            "AWS S3",
            "The specified bucket does not exist",
            "AWS S3 error message",
        ),
        re(
            "AWS S3",
            "(?i)aws.*s3.*error|amazon.*s3.*not found",
            "AWS S3 error variations",
        ),
        // CloudFront
        lit(
            "CloudFront",
            "The request could not be satisfied",
            "CloudFront error message",
        ),
        re(
            "CloudFront",
            "(?i)cloudfront.*error|aws.*cloudfront",
            "CloudFront error variations",
        ),
        // Fastly
        lit(
            "Fastly",
            "Fastly error: unknown domain",
            "Fastly error for unknown domain",
        ),
        lit(
            "Fastly",
            "Fastly error: unknown service",
            "Fastly error for unknown service",
        ),
        lit("Fastly", "Fastly has an error", "Fastly generic error"),
        // Heroku
        lit("Heroku", "no such app", "Heroku app not found"),
        lit(
            "Heroku",
            "There is no app configured at that hostname",
            "Heroku custom domain removed",
        ),
        re(
            "Heroku",
            "(?i)heroku.*not found|heroku.*error",
            "Heroku error variations",
        ),
        // GitLab Pages
        lit(
            "GitLab Pages",
            "The page you were looking for doesn't exist",
            "GitLab Pages 404 with GitLab references",
        ),
        re(
            "GitLab Pages",
            "(?i)gitlab.*pages.*not found|gitlab.*error",
            "GitLab Pages error variations",
        ),
        // Azure Blob Storage
        lit(
            "Azure Blob Storage",
            "The specified container does not exist",
            "Azure Blob Storage error",
        ),
        lit(
            "Azure Blob Storage",
            "Server failed to authenticate the request",
            "Azure authentication error",
        ),
        re(
            "Azure Blob Storage",
            "(?i)azure.*storage.*error|microsoft.*azure",
            "Azure error variations",
        ),
        // Firebase / GCP Hosting
        lit(
            "Firebase Hosting",
            "Project Not Found",
            "Firebase project not found",
        ),
        re(
            "Firebase Hosting",
            "(?i)firebase.*hosting.*error|gcp.*hosting.*error",
            "Firebase/GCP hosting error variations",
        ),
        // Surge
        lit("Surge", "project not found", "Surge project not found"),
        re(
            "Surge",
            "(?i)surge.*error|surge.*not found",
            "Surge error variations",
        ),
        // Generic
        re(
            "Generic",
            "(?i)(site not found|no such site|project not found|there isn't a .* site here|no such app|the specified bucket does not exist|no such host|this page is not available)",
            "Generic hosting service error patterns",
        ),
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_count_and_order() {
        assert_eq!(BUILTIN_FINGERPRINTS.len(), 27);
        assert_eq!(BUILTIN_FINGERPRINTS[0].service, "GitHub Pages");
        assert_eq!(BUILTIN_FINGERPRINTS.last().unwrap().service, "Generic");
    }

    #[test]
    fn every_builtin_has_notes() {
        assert!(BUILTIN_FINGERPRINTS.iter().all(|f| !f.notes.is_empty()));
    }
}
