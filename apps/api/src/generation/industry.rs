//! Industry knowledge table: sector challenges, strategies, platform capabilities and KPIs
//! injected into the generation prompt. Static, read-only.

/// Recommendation emphasis for industries with a known playbook.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationFocus {
    pub priority_focus: &'static str,
    pub key_capability: &'static str,
    pub expected_uplift: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndustryProfile {
    pub name: &'static str,
    pub challenges: &'static [&'static str],
    pub strategies: &'static [&'static str],
    pub capabilities: &'static [&'static str],
    pub kpis: &'static [&'static str],
    pub focus: Option<RecommendationFocus>,
}

static PROFILES: &[IndustryProfile] = &[
    IndustryProfile {
        name: "E-Commerce",
        challenges: &[
            "High cart abandonment rates (average 69%)",
            "Optimizing customer acquisition cost (CAC)",
            "Enhancing customer lifetime value (CLV)",
            "Personalizing the shopping experience at scale",
        ],
        strategies: &[
            "Implement multi-stage abandoned cart recovery campaigns.",
            "Utilize behavioral triggers for personalized product recommendations.",
            "Develop loyalty programs to increase customer retention.",
            "Optimize marketing spend by focusing on high-CLV customer segments.",
        ],
        capabilities: &[
            "Advanced segmentation based on purchase history and browsing behavior.",
            "AI-powered predictive recommendations for cross-sell and upsell.",
            "Journey builder for creating automated, multi-channel lifecycle campaigns.",
            "Revenue attribution to track the impact of marketing efforts.",
        ],
        kpis: &[
            "Conversion Rate",
            "Average Order Value (AOV)",
            "Customer Lifetime Value (CLV)",
            "Cart Abandonment Rate",
            "Revenue per Customer",
        ],
        focus: Some(RecommendationFocus {
            priority_focus: "Abandoned cart recovery and post-purchase journey optimization",
            key_capability: "Blueshift's behavioral triggers and product recommendation engine",
            expected_uplift: "45% improvement in cart recovery, 35% increase in repeat purchases",
        }),
    },
    IndustryProfile {
        name: "Finance",
        challenges: &[
            "Building and maintaining customer trust.",
            "Navigating strict regulatory and compliance requirements (e.g., GDPR, CCPA).",
            "High competition and low differentiation in product offerings.",
            "Educating customers on complex financial products.",
        ],
        strategies: &[
            "Create automated educational journeys for new customers.",
            "Use segmentation to deliver targeted, relevant financial advice.",
            "Implement secure and compliant communication channels.",
            "Develop loyalty programs that reward long-term customer relationships.",
        ],
        capabilities: &[
            "Secure data handling and compliance with industry standards.",
            "Segmentation based on financial product ownership and engagement.",
            "Multi-channel journeys for onboarding and customer education.",
            "Personalization of content to reflect customer's financial goals.",
        ],
        kpis: &[
            "Customer Retention Rate",
            "Cross-Sell Ratio",
            "Customer Satisfaction (CSAT)",
            "Product Adoption Rate",
            "Compliance Adherence",
        ],
        focus: Some(RecommendationFocus {
            priority_focus: "Lifecycle marketing and cross-sell optimization",
            key_capability: "Blueshift's compliance-ready platform and advanced segmentation",
            expected_uplift: "60% increase in cross-sell success, 25% improvement in customer engagement",
        }),
    },
    IndustryProfile {
        name: "Media",
        challenges: &[
            "High subscription churn rates.",
            "Monetizing content effectively without alienating the audience.",
            "Keeping audiences engaged in a crowded content landscape.",
            "Understanding content consumption patterns to inform strategy.",
        ],
        strategies: &[
            "Develop personalized content recommendations based on viewing history.",
            "Implement re-engagement campaigns for users at risk of churning.",
            "Use A/B testing to optimize headlines and content formats.",
            "Create exclusive content for loyal subscribers.",
        ],
        capabilities: &[
            "Tracking of content consumption across multiple platforms.",
            "AI-powered content recommendations to increase engagement.",
            "Segmentation based on content preferences and engagement levels.",
            "Automated journeys to manage the subscriber lifecycle.",
        ],
        kpis: &[
            "Subscriber Growth Rate",
            "Engagement Rate (e.g., time spent, articles read)",
            "Churn Rate",
            "Customer Lifetime Value (CLV)",
            "Ad Revenue per User",
        ],
        focus: None,
    },
];

/// Looks up a profile, ignoring case, surrounding whitespace and `-`/`_`/space differences.
pub fn find_profile(industry: &str) -> Option<&'static IndustryProfile> {
    let wanted = normalize(industry);
    if wanted.is_empty() {
        return None;
    }
    PROFILES.iter().find(|p| normalize(p.name) == wanted)
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_name_found() {
        let p = find_profile("Finance").unwrap();
        assert_eq!(p.name, "Finance");
        assert_eq!(p.kpis.len(), 5);
    }

    #[test]
    fn test_lookup_ignores_case_and_separators() {
        for alias in ["ecommerce", "E-Commerce", " e_commerce ", "E COMMERCE"] {
            assert_eq!(find_profile(alias).map(|p| p.name), Some("E-Commerce"), "{alias}");
        }
    }

    #[test]
    fn test_unknown_industry_has_no_profile() {
        assert!(find_profile("Aerospace").is_none());
        assert!(find_profile("").is_none());
    }

    #[test]
    fn test_every_profile_is_fully_populated() {
        for p in PROFILES {
            assert!(!p.challenges.is_empty(), "{}", p.name);
            assert!(!p.strategies.is_empty(), "{}", p.name);
            assert!(!p.capabilities.is_empty(), "{}", p.name);
            assert!(!p.kpis.is_empty(), "{}", p.name);
        }
    }

    #[test]
    fn test_media_has_no_recommendation_focus() {
        assert!(find_profile("media").unwrap().focus.is_none());
        assert!(find_profile("finance").unwrap().focus.is_some());
    }
}
