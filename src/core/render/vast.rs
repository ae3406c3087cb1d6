use crate::core::openrtb::Bid;

pub const DEFAULT_DURATION_SECS: u32 = 30;

const QUARTILE_EVENTS: [&str; 5] = [
    "start",
    "firstQuartile",
    "midpoint",
    "thirdQuartile",
    "complete",
];

pub fn is_vast_markup(adm: &str) -> bool {
    adm.contains("<VAST")
}

/// Extract the first `<Duration>` from embedded VAST markup.
/// Accepts HH:MM:SS, MM:SS and bare seconds
pub fn parse_vast_duration(markup: &str) -> Option<u32> {
    let start = markup.find("<Duration>")? + "<Duration>".len();
    let end = markup[start..].find("</Duration>")? + start;
    let raw = markup[start..end].trim();

    if raw.is_empty() {
        return None;
    }

    let mut secs: u64 = 0;
    for part in raw.split(':') {
        // drop fractional seconds if present
        let part = part.split('.').next().unwrap_or(part);
        secs = secs * 60 + part.parse::<u64>().ok()?;
    }

    u32::try_from(secs).ok()
}

/// Duration a bid plays for: parsed from its markup when it carries
/// VAST, 30s otherwise
pub fn bid_duration(bid: &Bid) -> u32 {
    bid.adm
        .as_deref()
        .and_then(parse_vast_duration)
        .unwrap_or(DEFAULT_DURATION_SECS)
}

fn format_duration(secs: u32) -> String {
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// The benign no-ad document served when the auction is empty
pub fn empty_vast() -> String {
    "<VAST version=\"3.0\"></VAST>".to_string()
}

/// Renders the winning bid as a VAST 3.0 document. Markup that is
/// already VAST passes through verbatim, anything else is treated as
/// a media URL and wrapped into a single linear creative with
/// quartile beacons pointing back at our tracking endpoints
pub fn render(origin: &str, event_id: &str, bid: &Bid) -> String {
    let adm = match &bid.adm {
        Some(adm) if !adm.is_empty() => adm,
        _ => return empty_vast(),
    };

    if is_vast_markup(adm) {
        return adm.clone();
    }

    let duration = format_duration(bid_duration(bid));
    let title = bid
        .adomain
        .first()
        .cloned()
        .unwrap_or_else(|| "Ad".to_string());

    let mut tracking = String::new();
    for event in QUARTILE_EVENTS {
        tracking.push_str(&format!(
            "<Tracking event=\"{event}\"><![CDATA[{origin}/publica/pixel/{event}?bid_id={event_id}]]></Tracking>"
        ));
    }

    format!(
        concat!(
            "<VAST version=\"3.0\">",
            "<Ad id=\"{ad_id}\">",
            "<InLine>",
            "<AdSystem>sellside</AdSystem>",
            "<AdTitle>{title}</AdTitle>",
            "<Impression><![CDATA[{origin}/impression/{event_id}]]></Impression>",
            "<Creatives><Creative><Linear>",
            "<Duration>{duration}</Duration>",
            "<TrackingEvents>{tracking}</TrackingEvents>",
            "<VideoClicks>",
            "<ClickThrough><![CDATA[{origin}/click/{event_id}]]></ClickThrough>",
            "</VideoClicks>",
            "<MediaFiles>",
            "<MediaFile delivery=\"progressive\" type=\"video/mp4\"><![CDATA[{adm}]]></MediaFile>",
            "</MediaFiles>",
            "</Linear></Creative></Creatives>",
            "</InLine>",
            "</Ad>",
            "</VAST>",
        ),
        ad_id = event_id,
        title = title,
        origin = origin,
        event_id = event_id,
        duration = duration,
        tracking = tracking,
        adm = adm,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::openrtb::BidBuilder;

    #[test]
    fn vast_markup_passes_through_verbatim() {
        let markup = "<VAST version=\"2.0\"><Ad></Ad></VAST>";
        let bid = BidBuilder::default()
            .id("b1")
            .adm(markup)
            .build()
            .unwrap();

        assert_eq!(render("https://ssp.example", "ev-1", &bid), markup);
    }

    #[test]
    fn media_url_is_wrapped_into_vast3() {
        let bid = BidBuilder::default()
            .id("b1")
            .adm("https://cdn.example/spot.mp4")
            .build()
            .unwrap();

        let doc = render("https://ssp.example", "ev-1", &bid);

        assert!(doc.starts_with("<VAST version=\"3.0\">"));
        assert!(doc.contains("<Duration>00:00:30</Duration>"));
        assert!(doc.contains("https://cdn.example/spot.mp4"));
        assert!(doc.contains("https://ssp.example/impression/ev-1"));

        for event in QUARTILE_EVENTS {
            assert!(doc.contains(&format!("Tracking event=\"{event}\"")));
        }
    }

    #[test]
    fn missing_markup_renders_the_empty_document() {
        let bid = BidBuilder::default().id("b1").build().unwrap();
        assert_eq!(render("https://ssp.example", "ev-1", &bid), empty_vast());
    }

    #[test]
    fn duration_parses_clock_and_seconds_forms() {
        assert_eq!(parse_vast_duration("<Duration>00:00:15</Duration>"), Some(15));
        assert_eq!(parse_vast_duration("<Duration>00:01:30</Duration>"), Some(90));
        assert_eq!(parse_vast_duration("<Duration>01:00:00</Duration>"), Some(3600));
        assert_eq!(parse_vast_duration("<Duration>45</Duration>"), Some(45));
        assert_eq!(
            parse_vast_duration("<Duration>00:00:15.000</Duration>"),
            Some(15)
        );
        assert_eq!(parse_vast_duration("<Duration></Duration>"), None);
        assert_eq!(parse_vast_duration("no duration here"), None);
    }

    #[test]
    fn bid_duration_prefers_embedded_vast() {
        let bid = BidBuilder::default()
            .id("b1")
            .adm("<VAST version=\"3.0\"><Duration>00:00:06</Duration></VAST>")
            .build()
            .unwrap();

        assert_eq!(bid_duration(&bid), 6);

        let bid = BidBuilder::default()
            .id("b1")
            .adm("https://cdn.example/spot.mp4")
            .build()
            .unwrap();

        assert_eq!(bid_duration(&bid), DEFAULT_DURATION_SECS);
    }
}
