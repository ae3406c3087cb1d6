use crate::app::ingress::{client_ip, header_string, RequestError};
use crate::core::models::adrequest::{AdRequest, CtvContent, Ingress};
use crate::core::openrtb::BidRequest;
use actix_web::HttpRequest;
use serde::Deserialize;
use std::collections::HashMap;

/// CTV default when an SSAI caller sends no usable size
pub const CTV_DEFAULT_W: u32 = 1920;
pub const CTV_DEFAULT_H: u32 = 1080;

/// Query parameters accepted on the ad-tag endpoint
#[derive(Debug, Default, Deserialize)]
pub struct AdTagQuery {
    pub placement_id: Option<String>,
    pub w: Option<u32>,
    pub h: Option<u32>,
    /// Floor override, may only raise the placement floor
    pub floor: Option<f64>,
    pub deal_id: Option<String>,
    pub page_url: Option<String>,
}

/// Publica SSAI decisioning body
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SsaiRequest {
    pub publisher_id: Option<String>,
    pub site_id: Option<String>,
    pub content_id: Option<String>,
    pub device_id: Option<String>,
    pub ip: Option<String>,
    pub ua: Option<String>,
    pub floor: Option<f64>,
    pub deal_id: Option<String>,
    pub content: Option<SsaiContent>,
    pub parameters: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SsaiContent {
    pub genre: Option<String>,
    pub rating: Option<String>,
    pub language: Option<String>,
}

/// Query parameters on the Publica VAST endpoint. Unexpanded Publica
/// macros (`$$CONTENT_ID$$` style) are treated as absent
#[derive(Debug, Default, Deserialize)]
pub struct PublicaVastQuery {
    #[serde(rename = "pub")]
    pub publisher_id: Option<String>,
    pub site: Option<String>,
    pub content: Option<String>,
    pub device: Option<String>,
    pub ip: Option<String>,
    pub ua: Option<String>,
    pub floor: Option<f64>,
    pub deal: Option<String>,
    pub placement_id: Option<String>,
    pub geo: Option<String>,
}

/// Parse a `"WxH"` size string, radix 10 only
pub fn parse_size(raw: &str) -> Option<(u32, u32)> {
    let (w, h) = raw.split_once(['x', 'X'])?;

    Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
}

fn strip_macro(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && !v.starts_with("$$"))
}

/// Ad-tag ingress: placement id plus standard headers
pub fn from_adtag(
    query: AdTagQuery,
    http_req: &HttpRequest,
    forwarded_headers: &[String],
) -> Result<AdRequest, RequestError> {
    let placement_id = match query.placement_id {
        Some(placement_id) if !placement_id.is_empty() => placement_id,
        _ => return Err(RequestError::BadRequest("placement_id is required".into())),
    };

    Ok(AdRequest {
        placement_id,
        page_url: query.page_url,
        referer: header_string(http_req, "referer"),
        ua: header_string(http_req, "user-agent"),
        ip: client_ip(http_req, forwarded_headers),
        w: query.w,
        h: query.h,
        floor: query.floor,
        deal_id: query.deal_id,
        ingress: Ingress::AdTag,
        ..Default::default()
    })
}

/// SSAI ingress: the stitcher addresses a site, size arrives as a
/// `"WxH"` parameter and falls back to CTV full HD
pub fn from_ssai(body: SsaiRequest) -> Result<AdRequest, RequestError> {
    if body.site_id.as_deref().unwrap_or_default().is_empty() {
        return Err(RequestError::BadRequest("site_id is required".into()));
    }

    let (w, h) = body
        .parameters
        .get("size")
        .and_then(|raw| parse_size(raw))
        .unwrap_or((CTV_DEFAULT_W, CTV_DEFAULT_H));

    let content = body.content_id.as_ref().map(|content_id| {
        let meta = body.content.unwrap_or_default();
        CtvContent {
            id: content_id.clone(),
            genre: meta.genre,
            rating: meta.rating,
            language: meta.language,
        }
    });

    Ok(AdRequest {
        placement_id: String::new(),
        publisher_id: body.publisher_id,
        site_id: body.site_id,
        ua: body.ua,
        ip: body.ip,
        w: Some(w),
        h: Some(h),
        floor: body.floor,
        deal_id: body.deal_id,
        device_ifa: body.device_id,
        content,
        ingress: Ingress::Ssai,
        ..Default::default()
    })
}

/// Publica VAST ingress, the same shape as SSAI but over GET
pub fn from_publica_vast(query: PublicaVastQuery) -> Result<AdRequest, RequestError> {
    let placement_id = strip_macro(query.placement_id).unwrap_or_default();
    let site_id = strip_macro(query.site);

    if placement_id.is_empty() && site_id.is_none() {
        return Err(RequestError::BadRequest(
            "placement_id or site is required".into(),
        ));
    }

    let content = strip_macro(query.content).map(|id| CtvContent {
        id,
        ..Default::default()
    });

    Ok(AdRequest {
        placement_id,
        publisher_id: strip_macro(query.publisher_id),
        site_id,
        ua: strip_macro(query.ua),
        ip: strip_macro(query.ip),
        w: Some(CTV_DEFAULT_W),
        h: Some(CTV_DEFAULT_H),
        floor: query.floor,
        deal_id: strip_macro(query.deal),
        device_ifa: strip_macro(query.device),
        geo_country: strip_macro(query.geo),
        content,
        ingress: Ingress::Vast,
        ..Default::default()
    })
}

/// Direct OpenRTB ingress is already canonical, only the projection
/// needed for catalog lookup and floors is derived here
pub fn from_openrtb(req: &BidRequest) -> Result<AdRequest, RequestError> {
    let imp = req
        .imp
        .first()
        .ok_or_else(|| RequestError::BadRequest("bid request carries no imp".into()))?;

    let placement_id = imp
        .tagid
        .clone()
        .filter(|tagid| !tagid.is_empty())
        .ok_or_else(|| RequestError::BadRequest("imp.tagid is required".into()))?;

    let deal_id = imp
        .pmp
        .as_ref()
        .and_then(|pmp| pmp.deals.first())
        .map(|deal| deal.id.clone());

    let device = req.device.as_ref();

    Ok(AdRequest {
        placement_id,
        page_url: req.site.as_ref().and_then(|site| site.page.clone()),
        referer: req.site.as_ref().and_then(|site| site.ref_.clone()),
        ua: device.and_then(|d| d.ua.clone()),
        ip: device.and_then(|d| d.ip.clone()),
        device_ifa: device.and_then(|d| d.ifa.clone()),
        geo_country: device
            .and_then(|d| d.geo.as_ref())
            .and_then(|geo| geo.country.clone()),
        floor: (imp.bidfloor > 0.0).then_some(imp.bidfloor),
        deal_id,
        ingress: Ingress::OpenRtb,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::openrtb::{Deal, Imp, Pmp};
    use actix_web::test::TestRequest;

    #[test]
    fn size_parses_radix_10_only() {
        assert_eq!(parse_size("1920x1080"), Some((1920, 1080)));
        assert_eq!(parse_size("300X250"), Some((300, 250)));
        assert_eq!(parse_size("0x10"), Some((0, 10)));
        assert_eq!(parse_size("wide"), None);
        assert_eq!(parse_size("10"), None);
        assert_eq!(parse_size("0xAx5"), None);
    }

    #[test]
    fn adtag_requires_a_placement_id() {
        let req = TestRequest::default().to_http_request();

        let result = from_adtag(AdTagQuery::default(), &req, &[]);
        assert!(matches!(result, Err(RequestError::BadRequest(_))));
    }

    #[test]
    fn adtag_reads_headers_and_overrides() {
        let req = TestRequest::default()
            .insert_header(("user-agent", "Mozilla/5.0"))
            .insert_header(("referer", "https://search.example"))
            .insert_header(("x-forwarded-for", "198.51.100.7"))
            .to_http_request();

        let query = AdTagQuery {
            placement_id: Some("plc-1".into()),
            floor: Some(1.25),
            deal_id: Some("PMP-1".into()),
            ..Default::default()
        };

        let ad_request = from_adtag(query, &req, &["x-forwarded-for".to_string()]).unwrap();

        assert_eq!(ad_request.placement_id, "plc-1");
        assert_eq!(ad_request.ua.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(ad_request.referer.as_deref(), Some("https://search.example"));
        assert_eq!(ad_request.ip.as_deref(), Some("198.51.100.7"));
        assert_eq!(ad_request.floor, Some(1.25));
        assert_eq!(ad_request.deal_id.as_deref(), Some("PMP-1"));
        assert_eq!(ad_request.ingress, Ingress::AdTag);
    }

    #[test]
    fn ssai_unparseable_size_defaults_to_full_hd() {
        let mut body = SsaiRequest {
            site_id: Some("site-003".into()),
            ..Default::default()
        };
        body.parameters.insert("size".into(), "huge".into());

        let ad_request = from_ssai(body).unwrap();
        assert_eq!(ad_request.w, Some(1920));
        assert_eq!(ad_request.h, Some(1080));
    }

    #[test]
    fn ssai_carries_content_and_deal() {
        let mut body = SsaiRequest {
            publisher_id: Some("p1-publica".into()),
            site_id: Some("site-003".into()),
            content_id: Some("content-9".into()),
            device_id: Some("ifa-1".into()),
            floor: Some(1.0),
            deal_id: Some("PMP-2024-003".into()),
            ..Default::default()
        };
        body.parameters.insert("size".into(), "1280x720".into());

        let ad_request = from_ssai(body).unwrap();

        assert_eq!(ad_request.w, Some(1280));
        assert_eq!(ad_request.content.as_ref().unwrap().id, "content-9");
        assert_eq!(ad_request.deal_id.as_deref(), Some("PMP-2024-003"));
        assert_eq!(ad_request.device_class(), "ctv");
    }

    #[test]
    fn ssai_without_site_is_a_bad_request() {
        let result = from_ssai(SsaiRequest::default());
        assert!(matches!(result, Err(RequestError::BadRequest(_))));
    }

    #[test]
    fn publica_macros_are_treated_as_absent() {
        let query = PublicaVastQuery {
            site: Some("site-003".into()),
            content: Some("$$CONTENT_ID$$".into()),
            device: Some("$$DEVICE_ID$$".into()),
            ..Default::default()
        };

        let ad_request = from_publica_vast(query).unwrap();
        assert!(ad_request.content.is_none());
        assert!(ad_request.device_ifa.is_none());
        assert_eq!(ad_request.site_id.as_deref(), Some("site-003"));
    }

    #[test]
    fn openrtb_projection_reads_tagid_and_deal() {
        let req = BidRequest {
            id: "r1".into(),
            imp: vec![Imp {
                id: "1".into(),
                tagid: Some("plc-1".into()),
                bidfloor: 0.8,
                pmp: Some(Pmp {
                    private_auction: Some(1),
                    deals: vec![Deal {
                        id: "PMP-1".into(),
                        ..Default::default()
                    }],
                }),
                ..Default::default()
            }],
            ..Default::default()
        };

        let ad_request = from_openrtb(&req).unwrap();

        assert_eq!(ad_request.placement_id, "plc-1");
        assert_eq!(ad_request.floor, Some(0.8));
        assert_eq!(ad_request.deal_id.as_deref(), Some("PMP-1"));
        assert_eq!(ad_request.ingress, Ingress::OpenRtb);
    }

    #[test]
    fn openrtb_without_tagid_is_a_bad_request() {
        let req = BidRequest {
            id: "r1".into(),
            imp: vec![Imp {
                id: "1".into(),
                ..Default::default()
            }],
            ..Default::default()
        };

        assert!(matches!(
            from_openrtb(&req),
            Err(RequestError::BadRequest(_))
        ));
    }
}
