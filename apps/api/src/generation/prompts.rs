// Prompt templates for QBR deck generation and the composer that fills them.
// Placeholders use `{name}` and are filled in a single pass, so JSON braces in the templates
// and placeholder-like text inside substituted values stay literal.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::generation::industry::{find_profile, IndustryProfile};

/// Inputs of a single prompt. Identical inputs always yield an identical prompt.
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    pub client_name: &'a str,
    pub client_website: &'a str,
    pub industry: &'a str,
    pub data_summary: &'a str,
}

/// Fallback prompt for industries without a profile.
/// Replace: {client_name}, {client_website}, {industry}, {data_summary}
pub const GENERIC_PROMPT_TEMPLATE: &str = r#"Generate a 2nd Quarter Business Review (QBR) presentation content for {client_name} ({client_website}),
an {industry} company.

The QBR should be structured into 6 slides with a 'title' and 'content' (as a JSON array of strings).
The slides are:
1.  **Executive Summary**: High-level overview of the quarter.
2.  **Performance Review**: Analysis of key metrics and campaign performance.
3.  **Key Achievements**: Highlight successful campaigns and milestones.
4.  **Challenges & Opportunities**: Identify areas for improvement and growth.
5.  **Strategic Recommendations**: Propose actionable strategies for the next quarter.
6.  **Q3 2025 Outlook**: Set goals and expectations for the upcoming quarter.

Format the output as a JSON object with the keys "slide1" through "slide6":
{
    "slide1": {"title": "Executive Summary", "content": ["Bullet point 1", "Bullet point 2"]},
    "slide2": {"title": "Performance Review", "content": ["Bullet point 1", "Bullet point 2"]}
}

Analyze the following data and incorporate it into the presentation:
{data_summary}
"#;

/// Industry-aware prompt.
/// Replace: {client_name}, {client_website}, {industry}, {industry_upper}, {challenges},
///          {strategies}, {capabilities}, {kpis}, {data_summary}, {priority_line},
///          {output_contract}, {worked_examples}
pub const INDUSTRY_PROMPT_TEMPLATE: &str = r#"Generate a comprehensive 2nd Quarter Business Review (QBR) presentation for {client_name} ({client_website}),
a leading company in the {industry} sector, leveraging Blueshift's customer engagement platform.

**INDUSTRY CONTEXT: {industry_upper}**
- **Key Challenges for this Industry**: {challenges}
- **Proven Strategies for Success**: {strategies}
- **Relevant Blueshift Capabilities**: {capabilities}
- **Core KPIs to Focus On**: {kpis}

**PERFORMANCE DATA ANALYSIS:**
Analyze the following campaign performance data summary. Identify trends, top-performing campaigns,
the best performing segments and segment categories, and areas with potential for improvement,
keeping the industry context in mind.
{data_summary}

**SLIDE STRUCTURE:**
1.  **Executive Summary**: High-level overview of the quarter, referencing key achievements and challenges in the context of the {industry} industry.
2.  **Performance Review**: Detailed analysis of key metrics from the data, comparing them to {industry} industry benchmarks and KPIs.
3.  **Key Achievements**: Highlight successful campaigns, explaining why they worked well for the {industry} market.
4.  **Challenges & Opportunities**: Identify challenges from the data and frame them as opportunities, considering the {industry} landscape.
5.  **Strategic Recommendations**: Propose actionable strategies for the next quarter, leveraging the identified Blueshift capabilities for the {industry} sector.{priority_line}
6.  **Q3 2025 Outlook**: Set specific, measurable, achievable, relevant, and time-bound (SMART) goals for the upcoming quarter that align with the client's objectives in the {industry} market.

{output_contract}

{worked_examples}

Ensure the entire output is a single, valid JSON object.
"#;

/// Output contract shared by every industry-aware prompt.
pub const OUTPUT_CONTRACT: &str = r#"**OUTPUT FORMAT:**
Return a JSON object with exactly 6 keys: "slide1", "slide2", ..., "slide6".
Each slide is an object with a "title" (string) and "content" (a JSON array of strings).
Where the data supports it, a slide may also include:
- "metrics": an array of {"name": string, "current": string, "previous": string, "change": string}
  where "change" is a signed percentage such as "+24%" or "-13%".
- "summary": an array of {"label": string, "value": string}.
- "tables": an array of {"title": string, "headers": [string, ...], "rows": [[string, ...], ...]}
  where every row has one cell per header.
Do not put table data inside "content"; never use the "|" character in content strings.

Example:
{
    "slide1": {
        "title": "Executive Summary",
        "content": ["Revenue grew 24% quarter over quarter", "..."],
        "summary": [{"label": "Revenue Growth", "value": "+24% ($3.2M vs $2.6M)"}],
        "metrics": [{"name": "Total Revenue", "current": "$3.2M", "previous": "$2.6M", "change": "+24%"}]
    },
    "slide2": {
        "title": "Performance Review",
        "content": ["..."],
        "tables": [{"title": "Revenue by Channel", "headers": ["Channel", "Q2", "Q1", "Growth %"], "rows": [["Email", "$1.2M", "$950K", "+26%"]]}]
    }
}"#;

/// Example phrasing for two slides to set the expected tone and depth.
pub const WORKED_EXAMPLES: &str = r#"**STYLE EXAMPLES (adapt to the client's own data, do not copy numbers):**
Slide 4, Challenges & Opportunities:
- "Engagement Opportunity: 67% of customers show higher lifetime value when experiencing personalized cross-channel journeys - Blueshift's AI can unlock this potential"
- "Data Utilization Gap: Only 31% of available customer data is currently leveraged for personalization - significant room for growth through Blueshift's unified customer profiles"
- metric row: {"name": "Email Engagement Rate", "current": "23.4%", "previous": "18.7%", "change": "+25%"}
Slide 5, Strategic Recommendations:
- "Immediate Priority: Deploy Blueshift's AI-powered journey orchestration to increase customer engagement by 45% and reduce manual campaign management by 60%"
- "Personalization Acceleration: Leverage Blueshift's real-time CDP to create dynamic, behavioral-triggered campaigns that deliver 3x higher conversion rates"
- table: {"title": "Priority Initiatives with ROI Projections", "headers": ["Strategic Initiative", "Blueshift Capability", "Expected ROI"], "rows": [["AI Journey Orchestration", "Smart Triggers + ML Optimization", "340% ROI"]]}"#;

/// Renders the prompt for one generation request. Pure; never touches the network.
pub fn compose_prompt(input: &PromptInput<'_>) -> String {
    match find_profile(input.industry) {
        Some(profile) => industry_prompt(input, profile),
        None => fill_template(
            GENERIC_PROMPT_TEMPLATE,
            &[
                ("client_name", input.client_name),
                ("client_website", input.client_website),
                ("industry", input.industry),
                ("data_summary", input.data_summary),
            ],
        ),
    }
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is valid"))
}

/// Substitutes each known `{name}` once. Unknown names are left as written.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    placeholder_pattern()
        .replace_all(template, |caps: &Captures<'_>| {
            values
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn industry_prompt(input: &PromptInput<'_>, profile: &IndustryProfile) -> String {
    let priority_line = profile
        .focus
        .as_ref()
        .map(|f| {
            format!(
                "\n    Open with an industry-specific priority: {} using {} - {}.",
                f.priority_focus, f.key_capability, f.expected_uplift
            )
        })
        .unwrap_or_default();

    let industry_upper = profile.name.to_uppercase();
    let challenges = profile.challenges.join(", ");
    let strategies = profile.strategies.join(", ");
    let capabilities = profile.capabilities.join(", ");
    let kpis = profile.kpis.join(", ");

    fill_template(
        INDUSTRY_PROMPT_TEMPLATE,
        &[
            ("output_contract", OUTPUT_CONTRACT),
            ("worked_examples", WORKED_EXAMPLES),
            ("priority_line", &priority_line),
            ("client_name", input.client_name),
            ("client_website", input.client_website),
            ("industry_upper", &industry_upper),
            ("industry", profile.name),
            ("challenges", &challenges),
            ("strategies", &strategies),
            ("capabilities", &capabilities),
            ("kpis", &kpis),
            ("data_summary", input.data_summary),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(industry: &'a str, summary: &'a str) -> PromptInput<'a> {
        PromptInput {
            client_name: "Acme",
            client_website: "acme.example",
            industry,
            data_summary: summary,
        }
    }

    #[test]
    fn test_unknown_industry_uses_generic_template() {
        let prompt = compose_prompt(&input("Aerospace", "rows here"));
        assert!(prompt.contains("Acme (acme.example)"));
        assert!(prompt.contains("an Aerospace company"));
        assert!(prompt.contains("Executive Summary"));
        assert!(prompt.contains("Q3 2025 Outlook"));
        assert!(prompt.contains("rows here"));
        assert!(!prompt.contains("INDUSTRY CONTEXT"));
        assert!(prompt.contains("\"slide1\""));
    }

    #[test]
    fn test_known_industry_enumerates_profile() {
        let prompt = compose_prompt(&input("finance", "summary text"));
        assert!(prompt.contains("INDUSTRY CONTEXT: FINANCE"));
        assert!(prompt.contains("Building and maintaining customer trust."));
        assert!(prompt.contains("Cross-Sell Ratio"));
        assert!(prompt.contains("Multi-channel journeys for onboarding"));
        assert!(prompt.contains("summary text"));
        assert!(prompt.contains("Lifecycle marketing and cross-sell optimization"));
    }

    #[test]
    fn test_known_industry_specifies_output_contract_and_examples() {
        let prompt = compose_prompt(&input("Media", "x"));
        for key in ["\"slide1\"", "\"slide6\"", "\"metrics\"", "\"summary\"", "\"tables\""] {
            assert!(prompt.contains(key), "missing {key}");
        }
        assert!(prompt.contains("Slide 4, Challenges & Opportunities"));
        assert!(prompt.contains("Slide 5, Strategic Recommendations"));
        assert!(!prompt.contains("industry-specific priority"));
    }

    #[test]
    fn test_no_placeholder_left_unfilled() {
        let prompt = compose_prompt(&input("E-Commerce", "data"));
        for placeholder in [
            "{client_name}",
            "{industry}",
            "{challenges}",
            "{data_summary}",
            "{output_contract}",
            "{worked_examples}",
            "{priority_line}",
        ] {
            assert!(!prompt.contains(placeholder), "unfilled {placeholder}");
        }
    }

    #[test]
    fn test_summary_is_embedded_verbatim() {
        let summary = "Campaign: Spring; Revenue: {industry}";
        let prompt = compose_prompt(&input("Media", summary));
        assert!(prompt.contains(summary));
    }

    #[test]
    fn test_client_values_are_not_expanded() {
        let prompt = compose_prompt(&PromptInput {
            client_name: "Acme {industry}",
            client_website: "{kpis}.example",
            industry: "Finance",
            data_summary: "data",
        });
        assert!(prompt.contains("Acme {industry}"));
        assert!(prompt.contains("{kpis}.example"));

        let generic = compose_prompt(&PromptInput {
            client_name: "{data_summary}",
            ..input("Aerospace", "rows")
        });
        assert!(generic.contains("{data_summary} ("));
    }

    #[test]
    fn test_composition_is_deterministic() {
        let a = compose_prompt(&input("E-Commerce", "same"));
        let b = compose_prompt(&input("E-Commerce", "same"));
        assert_eq!(a, b);
    }
}
