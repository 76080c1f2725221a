//! Freshness policy
//!
//! A pure table from (resource type, usage context) to the maximum acceptable
//! age of a cached entry. The same stored entry can be fresh for a simple
//! display and stale for a bid submission at the same instant; usage drives
//! the decision at read time, not a per-entry TTL.

use crate::key::ResourceType;
use chrono::{DateTime, Duration, Utc};

/// What the cached entry will be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UsageContext {
    /// Simple display / consultation
    #[default]
    Info,
    /// DC1/DC2 generation for a real bid; company status and collective
    /// proceedings must be recent
    Candidature,
    /// Fuzzy name search results
    Search,
}

/// Read-time classification of a cached entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Serve from cache
    Fresh,
    /// Treat as a miss and refetch
    Stale,
}

/// Maximum acceptable entry age for a (resource, usage) pair
pub fn max_age(resource: ResourceType, usage: UsageContext) -> Duration {
    match resource {
        ResourceType::Entreprise => match usage {
            UsageContext::Info => Duration::days(180),
            UsageContext::Candidature => Duration::days(30),
            UsageContext::Search => Duration::days(90),
        },
        ResourceType::EntrepriseSearch => Duration::days(90),
        ResourceType::DocumentAnalysis => Duration::days(180),
        ResourceType::MarcheAnalysis => Duration::days(30),
    }
}

/// Classify an entry written at `written_at` as of `now`
pub fn classify(
    resource: ResourceType,
    usage: UsageContext,
    written_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Freshness {
    if now - written_at < max_age(resource, usage) {
        Freshness::Fresh
    } else {
        Freshness::Stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_sensitivity() {
        // A company entry aged 2 months is fresh for display but stale for a
        // candidature.
        let now = Utc::now();
        let written_at = now - Duration::days(60);

        assert_eq!(
            classify(ResourceType::Entreprise, UsageContext::Info, written_at, now),
            Freshness::Fresh
        );
        assert_eq!(
            classify(
                ResourceType::Entreprise,
                UsageContext::Candidature,
                written_at,
                now
            ),
            Freshness::Stale
        );
    }

    #[test]
    fn test_freshness_boundary() {
        let now = Utc::now();
        let age = max_age(ResourceType::MarcheAnalysis, UsageContext::Info);

        let just_inside = now - (age - Duration::seconds(1));
        let just_outside = now - (age + Duration::seconds(1));

        assert_eq!(
            classify(ResourceType::MarcheAnalysis, UsageContext::Info, just_inside, now),
            Freshness::Fresh
        );
        assert_eq!(
            classify(ResourceType::MarcheAnalysis, UsageContext::Info, just_outside, now),
            Freshness::Stale
        );
    }

    #[test]
    fn test_exact_age_is_stale() {
        // The window is half-open: age == max age forces a refetch.
        let now = Utc::now();
        let age = max_age(ResourceType::DocumentAnalysis, UsageContext::Info);
        assert_eq!(
            classify(ResourceType::DocumentAnalysis, UsageContext::Info, now - age, now),
            Freshness::Stale
        );
    }

    #[test]
    fn test_policy_table() {
        assert_eq!(
            max_age(ResourceType::Entreprise, UsageContext::Info),
            Duration::days(180)
        );
        assert_eq!(
            max_age(ResourceType::Entreprise, UsageContext::Candidature),
            Duration::days(30)
        );
        assert_eq!(
            max_age(ResourceType::Entreprise, UsageContext::Search),
            Duration::days(90)
        );
        // Analyses have no usage variants
        assert_eq!(
            max_age(ResourceType::DocumentAnalysis, UsageContext::Candidature),
            Duration::days(180)
        );
        assert_eq!(
            max_age(ResourceType::MarcheAnalysis, UsageContext::Search),
            Duration::days(30)
        );
    }
}
