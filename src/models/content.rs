//! Site content document rendered on the public page.

use serde::{Deserialize, Serialize};

/// Single row id holding the content document.
pub const SITE_CONTENT_ID: &str = "primary";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HeroContent {
    pub badge: String,
    pub title: String,
    pub description: String,
    pub primary_cta: String,
    pub secondary_cta: String,
    pub featured_label: String,
    pub featured_cta: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stat {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PackagesContent {
    pub title: String,
    pub description: String,
    pub cta_label: String,
    pub card_cta: String,
}

/// Title plus body text; used by the "why" and "support" sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextItem {
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepItem {
    pub label: String,
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Testimonial {
    pub quote: String,
    pub name: String,
}

/// A titled section with a list of items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Section<T> {
    pub title: String,
    pub description: String,
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactContent {
    pub form_title: String,
    pub title: String,
    pub description: String,
    pub direct_title: String,
    pub direct_description: String,
    pub phone_label: String,
    pub phone: String,
    pub email_label: String,
    pub email: String,
    pub office_label: String,
    pub office: String,
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FooterContent {
    pub tagline: String,
    pub quick_links_label: String,
    pub support_label: String,
    pub support_items: Vec<String>,
}

/// The full editable marketing copy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SiteContent {
    pub hero: HeroContent,
    pub stats: Vec<Stat>,
    pub packages: PackagesContent,
    pub why: Section<TextItem>,
    pub steps: Section<StepItem>,
    pub testimonials: Section<Testimonial>,
    pub support: Section<TextItem>,
    pub contact: ContactContent,
    pub footer: FooterContent,
}

fn text_item(title: &str, text: &str) -> TextItem {
    TextItem {
        title: title.to_string(),
        text: text.to_string(),
    }
}

fn step(label: &str, title: &str, text: &str) -> StepItem {
    StepItem {
        label: label.to_string(),
        title: title.to_string(),
        text: text.to_string(),
    }
}

fn testimonial(quote: &str, name: &str) -> Testimonial {
    Testimonial {
        quote: quote.to_string(),
        name: name.to_string(),
    }
}

fn stat(value: &str, label: &str) -> Stat {
    Stat {
        value: value.to_string(),
        label: label.to_string(),
    }
}

impl Default for SiteContent {
    fn default() -> Self {
        Self {
            hero: HeroContent {
                badge: "Comfort-first travel planning".to_string(),
                title: "Travel in comfort, guided by the people who know each destination best."
                    .to_string(),
                description: "Zentura creates stress-free trips for new and returning clients. We handpick stays, arrange permits, and keep your itinerary seamless from arrival to departure.".to_string(),
                primary_cta: "Plan my trip".to_string(),
                secondary_cta: "View packages".to_string(),
                featured_label: "Featured this month".to_string(),
                featured_cta: "Reserve now".to_string(),
            },
            stats: vec![
                stat("120+", "Curated departures"),
                stat("4.8/5", "Traveler satisfaction"),
                stat("24/7", "Trip support"),
            ],
            packages: PackagesContent {
                title: "Signature travel packages".to_string(),
                description: "Choose a ready-to-go itinerary or let us customize every detail. All packages are designed for comfort, smooth transfers, and trusted local guides.".to_string(),
                cta_label: "Request a custom quote".to_string(),
                card_cta: "Book now".to_string(),
            },
            why: Section {
                title: "Why travelers trust Zentura".to_string(),
                description: "We handle the hard parts so you can relax. Dedicated support keeps new clients confident and repeat clients delighted.".to_string(),
                items: vec![
                    text_item(
                        "Permit and paperwork cleared",
                        "Entry permits, police clearance certificates, and destination approvals coordinated in advance.",
                    ),
                    text_item(
                        "Comfort-first stays",
                        "Verified hotels, daily breakfast, and local hosts that know how to take care of you.",
                    ),
                    text_item(
                        "On-trip concierge",
                        "From airport pickup to last-day checkout, we stay in touch with you and your family.",
                    ),
                    text_item(
                        "Local experience",
                        "Trusted guides, community-driven activities, and safe adventure add-ons.",
                    ),
                ],
            },
            steps: Section {
                title: "How it works".to_string(),
                description: "We keep things simple for you and transparent for your team.".to_string(),
                items: vec![
                    step(
                        "Step 01",
                        "Share your travel goals",
                        "Tell us where, when, and who is traveling. We will capture preferences and comfort needs.",
                    ),
                    step(
                        "Step 02",
                        "Receive a curated plan",
                        "We send you a clear itinerary, inclusions, exclusions, and a transparent price breakdown.",
                    ),
                    step(
                        "Step 03",
                        "Travel with support",
                        "Dedicated coordinators stay available before and during the trip for quick updates.",
                    ),
                ],
            },
            testimonials: Section {
                title: "Traveler stories".to_string(),
                description: "Real feedback from families and professionals who chose Zentura for their stress-free travel.".to_string(),
                items: vec![
                    testimonial(
                        "Zentura handled every approval for Lakshadweep and kept us calm even during flight delays.",
                        "Asha, Bengaluru",
                    ),
                    testimonial(
                        "We loved the daily check-ins and local guides. It felt personal and safe.",
                        "Rahul, Hyderabad",
                    ),
                    testimonial(
                        "The stay recommendations were perfect for our parents. Everything was pre-arranged.",
                        "Meera, Mumbai",
                    ),
                ],
            },
            support: Section {
                title: "Support for existing clients".to_string(),
                description: "Already traveling with Zentura? Get quick updates and connect with your trip coordinator instantly.".to_string(),
                items: vec![
                    text_item(
                        "Trip updates",
                        "Receive itinerary confirmations, transfer details, and day-wise reminders in one place.",
                    ),
                    text_item(
                        "Concierge hotline",
                        "A dedicated contact for urgent changes, weather alerts, or last-minute upgrades.",
                    ),
                    text_item(
                        "Partner network",
                        "Local hosts and drivers stay synced with your travel needs.",
                    ),
                ],
            },
            contact: ContactContent {
                form_title: "Trip inquiry".to_string(),
                title: "Plan your next trip".to_string(),
                description: "Tell us your preferred dates and comfort needs. We will respond with a curated plan and pricing.".to_string(),
                direct_title: "Reach Zentura directly".to_string(),
                direct_description: "We answer quickly for new clients and returning clients who need updates.".to_string(),
                phone_label: "Phone".to_string(),
                phone: "+91 00000 00000".to_string(),
                email_label: "Email".to_string(),
                email: "hello@yourdomain.com".to_string(),
                office_label: "Office".to_string(),
                office: "Bengaluru, India".to_string(),
                note: "Admin can manage inquiries, trips, and images from the admin dashboard."
                    .to_string(),
            },
            footer: FooterContent {
                tagline: "Travel with comfort, guided by trust. We are ready to launch on your existing domain.".to_string(),
                quick_links_label: "Quick links".to_string(),
                support_label: "Client support".to_string(),
                support_items: vec![
                    "24/7 coordinator access".to_string(),
                    "Custom itinerary updates".to_string(),
                    "Local assistance on-site".to_string(),
                ],
            },
        }
    }
}

/// Response body for content reads carrying the cached copy's version.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionedContent {
    pub version: i64,
    pub content: SiteContent,
}
