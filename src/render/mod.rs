//! Public page rendering.
//!
//! Projects the site copy and trip list into the single marketing page. All
//! user-editable text goes through [`escape_html`].

use std::fmt::Write;

use crate::models::{SiteContent, Trip, DEFAULT_CURRENCY};

/// Option appended to the contact form's trip select.
pub const CUSTOM_ITINERARY: &str = "Custom itinerary";

const INCLUSIONS_SHOWN: usize = 4;
const EXCLUSIONS_SHOWN: usize = 2;

/// Escape text for HTML element and attribute content.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `INR 16,000` with Indian digit grouping for rupees, `USD 1,234.5` otherwise.
pub fn format_price(value: f64, currency: &str) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let indian = currency == DEFAULT_CURRENCY;
    format!("{} {}", currency, format_number(value, indian))
}

/// Locale-style number: up to three fraction digits, trailing zeros dropped.
fn format_number(value: f64, indian: bool) -> String {
    let rounded = format!("{:.3}", value.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::new();
    if value < 0.0 && (int_part != "0" || !frac_part.is_empty()) {
        out.push('-');
    }
    out.push_str(&group_digits(int_part, indian));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Thousands grouping. Indian grouping keeps the last three digits together and
/// pairs the rest (`12,34,567`).
fn group_digits(digits: &str, indian: bool) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let group = if indian { 2 } else { 3 };

    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(group);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    groups.push(tail);
    groups.join(",")
}

pub fn render_trip_card(trip: &Trip) -> String {
    let list = |items: &[String], limit: usize| -> String {
        items
            .iter()
            .take(limit)
            .map(|item| format!("<li>{}</li>", escape_html(item)))
            .collect()
    };

    let image = if trip.image.is_empty() {
        r#"<div class="trip-image"></div>"#.to_string()
    } else {
        format!(
            r#"<img src="{}" alt="{}" />"#,
            escape_html(&trip.image),
            escape_html(&trip.title)
        )
    };
    let label = if trip.featured { "Featured" } else { "Comfort pick" };

    format!(
        r##"<article class="trip-card">
  {image}
  <div class="trip-body">
    <div class="trip-title">
      <div>
        <h3>{title}</h3>
        <p class="trip-meta">{location} | {duration}</p>
      </div>
      <span class="trip-price">{price}</span>
    </div>
    <p class="trip-meta">{description}</p>
    <div>
      <strong>Top inclusions</strong>
      <ul class="list">{inclusions}</ul>
    </div>
    <div>
      <strong>Exclusions</strong>
      <ul class="list">{exclusions}</ul>
    </div>
    <div class="trip-actions">
      <span class="label">{label}</span>
      <a class="btn btn-primary" href="#contact" data-trip="{title}">Book now</a>
    </div>
  </div>
</article>"##,
        image = image,
        title = escape_html(&trip.title),
        location = escape_html(&trip.location),
        duration = escape_html(&trip.duration),
        price = escape_html(&format_price(trip.price, &trip.currency)),
        description = escape_html(&trip.description),
        inclusions = list(&trip.inclusions, INCLUSIONS_SHOWN),
        exclusions = list(&trip.exclusions, EXCLUSIONS_SHOWN),
        label = label,
    )
}

pub fn render_trip_grid(trips: &[Trip]) -> String {
    trips
        .iter()
        .map(render_trip_card)
        .collect::<Vec<_>>()
        .join("\n")
}

/// `<option>`s for the contact form, one per trip plus the custom choice.
pub fn render_trip_options(trips: &[Trip]) -> String {
    let mut out: String = trips
        .iter()
        .map(|trip| {
            let title = escape_html(&trip.title);
            format!(r#"<option value="{title}">{title}</option>"#)
        })
        .collect();
    let _ = write!(
        out,
        r#"<option value="{0}">{0}</option>"#,
        CUSTOM_ITINERARY
    );
    out
}

/// The full public page.
pub fn render_home_page(content: &SiteContent, trips: &[Trip]) -> String {
    let e = escape_html;
    let mut page = String::with_capacity(16 * 1024);

    let _ = write!(
        page,
        r##"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8" />
<meta name="viewport" content="width=device-width, initial-scale=1" />
<title>Zentura | {title}</title>
</head>
<body>
<section class="hero" id="home">
  <span class="badge">{badge}</span>
  <h1>{title}</h1>
  <p>{description}</p>
  <div class="hero-actions">
    <a class="btn btn-primary" href="#packages">{primary}</a>
    <a class="btn btn-ghost" href="#contact">{secondary}</a>
  </div>
  <div class="stats">"##,
        title = e(&content.hero.title),
        badge = e(&content.hero.badge),
        description = e(&content.hero.description),
        primary = e(&content.hero.primary_cta),
        secondary = e(&content.hero.secondary_cta),
    );
    for stat in &content.stats {
        let _ = write!(
            page,
            r#"<div class="stat"><strong>{}</strong><span>{}</span></div>"#,
            e(&stat.value),
            e(&stat.label)
        );
    }
    page.push_str("</div>\n</section>\n");

    let _ = write!(
        page,
        r#"<section id="packages">
  <h2>{}</h2>
  <p>{}</p>
  <div class="trip-grid" id="tripGrid">
{}
  </div>
</section>
"#,
        e(&content.packages.title),
        e(&content.packages.description),
        render_trip_grid(trips)
    );

    let _ = write!(
        page,
        r#"<section id="why"><h2>{}</h2><p>{}</p><div class="grid">"#,
        e(&content.why.title),
        e(&content.why.description)
    );
    for item in &content.why.items {
        let _ = write!(page, "<article><h3>{}</h3><p>{}</p></article>", e(&item.title), e(&item.text));
    }
    page.push_str("</div></section>\n");

    let _ = write!(
        page,
        r#"<section id="process"><h2>{}</h2><p>{}</p><ol class="steps">"#,
        e(&content.steps.title),
        e(&content.steps.description)
    );
    for step in &content.steps.items {
        let _ = write!(
            page,
            "<li><span>{}</span><h3>{}</h3><p>{}</p></li>",
            e(&step.label),
            e(&step.title),
            e(&step.text)
        );
    }
    page.push_str("</ol></section>\n");

    let _ = write!(
        page,
        r#"<section id="testimonials"><h2>{}</h2><p>{}</p><div class="grid">"#,
        e(&content.testimonials.title),
        e(&content.testimonials.description)
    );
    for t in &content.testimonials.items {
        let _ = write!(
            page,
            "<blockquote><p>{}</p><cite>{}</cite></blockquote>",
            e(&t.quote),
            e(&t.name)
        );
    }
    page.push_str("</div></section>\n");

    let _ = write!(
        page,
        r#"<section id="support"><h2>{}</h2><p>{}</p><div class="grid">"#,
        e(&content.support.title),
        e(&content.support.description)
    );
    for item in &content.support.items {
        let _ = write!(page, "<article><h3>{}</h3><p>{}</p></article>", e(&item.title), e(&item.text));
    }
    page.push_str("</div></section>\n");

    let c = &content.contact;
    let _ = write!(
        page,
        r#"<section id="contact">
  <div>
    <h2>{title}</h2>
    <p>{description}</p>
    <h3>{direct_title}</h3>
    <p>{direct_description}</p>
    <p>{phone_label}: {phone}</p>
    <p>{email_label}: {email}</p>
    <p>{office_label}: {office}</p>
    <p class="note">{note}</p>
  </div>
  <form id="contactForm" method="post" action="/api/messages">
    <h3>{form_title}</h3>
    <input name="name" required />
    <input name="email" type="email" />
    <input name="phone" />
    <select name="trip" id="trip">{options}</select>
    <input name="month" />
    <textarea name="message"></textarea>
    <button class="btn btn-primary" type="submit">Send</button>
  </form>
</section>
"#,
        title = e(&c.title),
        description = e(&c.description),
        direct_title = e(&c.direct_title),
        direct_description = e(&c.direct_description),
        phone_label = e(&c.phone_label),
        phone = e(&c.phone),
        email_label = e(&c.email_label),
        email = e(&c.email),
        office_label = e(&c.office_label),
        office = e(&c.office),
        note = e(&c.note),
        form_title = e(&c.form_title),
        options = render_trip_options(trips),
    );

    let f = &content.footer;
    let _ = write!(
        page,
        r#"<footer><p>{}</p><h4>{}</h4><h4>{}</h4><ul>"#,
        e(&f.tagline),
        e(&f.quick_links_label),
        e(&f.support_label)
    );
    for item in &f.support_items {
        let _ = write!(page, "<li>{}</li>", e(item));
    }
    page.push_str("</ul></footer>\n</body>\n</html>\n");
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_trips;

    #[test]
    fn test_format_price_inr_grouping() {
        assert_eq!(format_price(16000.0, "INR"), "INR 16,000");
        assert_eq!(format_price(1234567.0, "INR"), "INR 12,34,567");
        assert_eq!(format_price(999.0, "INR"), "INR 999");
        assert_eq!(format_price(0.0, "INR"), "INR 0");
    }

    #[test]
    fn test_format_price_other_currency() {
        assert_eq!(format_price(1234567.0, "USD"), "USD 1,234,567");
        assert_eq!(format_price(1234.5, "EUR"), "EUR 1,234.5");
        assert_eq!(format_price(2.0004, "USD"), "USD 2");
        assert_eq!(format_price(f64::NAN, "USD"), "USD 0");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_trip_card_limits_lists() {
        let trip = default_trips().remove(0);
        let card = render_trip_card(&trip);
        assert_eq!(card.matches("<li>").count(), INCLUSIONS_SHOWN + EXCLUSIONS_SHOWN);
        assert!(card.contains("INR 16,000"));
        assert!(card.contains(r#"<span class="label">Featured</span>"#));
    }

    #[test]
    fn test_trip_card_escapes_title() {
        let mut trip = default_trips().remove(1);
        trip.title = "<script>x</script>".to_string();
        trip.image = String::new();
        let card = render_trip_card(&trip);
        assert!(!card.contains("<script>"));
        assert!(card.contains(r#"<div class="trip-image"></div>"#));
        assert!(card.contains("Comfort pick"));
    }

    #[test]
    fn test_trip_options_end_with_custom() {
        let options = render_trip_options(&default_trips());
        assert_eq!(options.matches("<option").count(), 4);
        assert!(options.ends_with(r#"<option value="Custom itinerary">Custom itinerary</option>"#));
    }

    #[test]
    fn test_home_page_contains_content_and_trips() {
        let content = SiteContent::default();
        let page = render_home_page(&content, &default_trips());
        assert!(page.contains(&escape_html(&content.hero.title)));
        assert!(page.contains("Lakshadweep Trip"));
        assert_eq!(page.matches(r#"<article class="trip-card">"#).count(), 3);
    }

    #[test]
    fn test_page_links_to_sections() {
        let page = render_home_page(&SiteContent::default(), &default_trips());
        assert!(page.contains(r##"href="#packages""##));
        assert_eq!(page.matches(r##"href="#contact""##).count(), 4);
        assert!(page.contains(r##"data-trip="Lakshadweep Trip""##));
    }
}
