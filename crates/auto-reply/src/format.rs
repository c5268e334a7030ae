//! Message text composition: bridge emphasis, the profile template, and the
//! canned replies.
//!
//! Bridge templates come out of the listings sheet as one line with `!` and
//! `;` marking line breaks. Rendering turns the separators into newlines and
//! bolds the known section labels.

use leadline_directory::CompanyDetails;

/// Health-check command and its reply.
pub const PING_COMMAND: &str = "!ping";
pub const PONG_REPLY: &str = "pong";

/// Sent when no session can be matched to the sender.
pub const EXPIRED_LINK_NOTICE: &str = "Hello! It looks like your inquiry link may have expired. Please generate a new chat link from our website to get personalized moving service details.";

/// Sent when the company lookup fails for a matched session.
pub const COMPANY_UNAVAILABLE_APOLOGY: &str =
    "I am sorry, I cannot find the details for this company. Please try again later.";

/// Label substitutions applied to the bridge text, first match wins,
/// case-insensitive. Replacements carry the canonical casing.
const EMPHASIS: &[(&str, &str)] = &[
    ("Company Name:", "*Company Name:*"),
    ("Services Offered:", "*Services Offered:*"),
    ("Cost:", "*Cost:*"),
    ("Service Area:", "*Service Area:*"),
    ("Note:", "*Note:*"),
    ("How to Find Them", "*How to Find Them*"),
    ("Search their name on Google", "• Search their name on *Google*"),
    ("look them up on Facebook", "look them up on *Facebook*"),
];

/// Render a bridge template for sending.
///
/// The separator pass runs before emphasis; running it after would split the
/// bolded `*MSF!*` greeting on its own exclamation mark.
#[must_use]
pub fn format_bridge(template: &str) -> String {
    let text = template.replace(['!', ';'], "\n");
    let text = replace_first_ci(&text, "MSF\n", "*MSF!*\n");
    EMPHASIS
        .iter()
        .fold(text, |acc, (plain, styled)| {
            replace_first_ci(&acc, plain, styled)
        })
}

/// Render the detailed profile message for a full listing.
#[must_use]
pub fn format_profile(details: &CompanyDetails) -> String {
    let rates: String = details
        .service_rates
        .iter()
        .map(|rate| format!("• {rate}\n"))
        .collect();
    format!(
        "📍 *{company}*\n\n\
         💰 *Service Rates*\n\
         {rates}\n\
         👨‍✈️ *Owner / Driver*\n{owner}\n\n\
         🗣️ *Languages*\n{languages}\n\n\
         🚗 *Vehicle Model & Licensed*\n{vehicle}\n✅ Licensed: {licensed}\n\n\
         🗺️ *Coverage Area*\n{coverage}\n\n\
         🧰 *Services*\n{services}\n\n\
         📆 *Availability*\n{availability}\n\n\
         ☎️ *Contact Method*\n{contact}\n\n\
         {thanks}",
        company = details.company,
        rates = rates,
        owner = details.owner_driver,
        languages = details.languages.join(", "),
        vehicle = details.vehicle_model,
        licensed = details.licensed,
        coverage = details.coverage,
        services = details.services,
        availability = details.availability,
        contact = details.contact_method,
        thanks = details.thank_you_message,
    )
}

/// Replace the first occurrence of `needle`, ignoring ASCII case.
fn replace_first_ci(haystack: &str, needle: &str, replacement: &str) -> String {
    let found = haystack.char_indices().map(|(i, _)| i).find(|&i| {
        haystack[i..]
            .as_bytes()
            .get(..needle.len())
            .is_some_and(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
    });
    match found {
        Some(i) => {
            let mut out = String::with_capacity(haystack.len() + replacement.len());
            out.push_str(&haystack[..i]);
            out.push_str(replacement);
            out.push_str(&haystack[i + needle.len()..]);
            out
        },
        None => haystack.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_renders_full_template() {
        let template = "MSF! Company Name: Acme Movers; Services Offered: Home moves; \
                        Cost: From 20k; Service Area: Lagos; Note: Quotes are free; \
                        How to Find Them; Search their name on Google; look them up on Facebook";
        assert_eq!(
            format_bridge(template),
            concat!(
                "*MSF!*\n",
                " *Company Name:* Acme Movers\n",
                " *Services Offered:* Home moves\n",
                " *Cost:* From 20k\n",
                " *Service Area:* Lagos\n",
                " *Note:* Quotes are free\n",
                " *How to Find Them*\n",
                " • Search their name on *Google*\n",
                " look them up on *Facebook*",
            )
        );
    }

    #[test]
    fn greeting_keeps_its_exclamation_mark() {
        let rendered = format_bridge("MSF! Cost: 10k");
        assert!(rendered.starts_with("*MSF!*\n"));
        assert!(!rendered.contains("*MSF\n*"));
    }

    #[test]
    fn labels_match_case_insensitively() {
        assert_eq!(
            format_bridge("company name: Zenith"),
            "*Company Name:* Zenith"
        );
    }

    #[test]
    fn only_first_occurrence_is_emphasized() {
        assert_eq!(
            format_bridge("Cost: 10k; Cost: 12k"),
            "*Cost:* 10k\n Cost: 12k"
        );
    }

    #[test]
    fn template_without_labels_only_gets_line_breaks() {
        assert_eq!(format_bridge("Hello; welcome!"), "Hello\n welcome\n");
    }

    #[test]
    fn profile_template_renders_every_section() {
        let details = CompanyDetails {
            company: "Acme Movers".into(),
            owner_driver: "Ade".into(),
            languages: vec!["English".into(), "Yoruba".into()],
            service_rates: vec![
                "Mini move - 20k".into(),
                "Studio - 35k".into(),
                "2 bed - 50k".into(),
                "Office - quote".into(),
            ],
            vehicle_model: "Sienna 2014".into(),
            licensed: "Yes".into(),
            coverage: "Lagos mainland".into(),
            services: "Packing, hauling".into(),
            custom_offers: "Weekend discount".into(),
            availability: "Mon-Sat".into(),
            contact_method: "Chat here".into(),
            thank_you_message: "Thank you for choosing Acme!".into(),
        };

        assert_eq!(
            format_profile(&details),
            concat!(
                "📍 *Acme Movers*\n\n",
                "💰 *Service Rates*\n",
                "• Mini move - 20k\n",
                "• Studio - 35k\n",
                "• 2 bed - 50k\n",
                "• Office - quote\n\n",
                "👨‍✈️ *Owner / Driver*\nAde\n\n",
                "🗣️ *Languages*\nEnglish, Yoruba\n\n",
                "🚗 *Vehicle Model & Licensed*\nSienna 2014\n✅ Licensed: Yes\n\n",
                "🗺️ *Coverage Area*\nLagos mainland\n\n",
                "🧰 *Services*\nPacking, hauling\n\n",
                "📆 *Availability*\nMon-Sat\n\n",
                "☎️ *Contact Method*\nChat here\n\n",
                "Thank you for choosing Acme!",
            )
        );
    }
}
