use crate::app::pipeline::auction::context::AuctionContext;
use crate::core::models::auction::AUCTION_TYPE_SECOND_PRICE;
use crate::core::models::placement::{AdType, Placement};
use crate::core::openrtb::{
    Audio, Banner, BidRequest, Deal, Device, Format, Geo, Imp, Native, Pmp, Publisher, Site,
    Source, Video,
};
use crate::core::pipeline::BlockingTask;
use anyhow::{anyhow, bail, Error};
use std::time::Duration;
use uuid::Uuid;

/// Produces the canonical OpenRTB request for the auction. Ad-tag,
/// VAST and SSAI ingress get a fresh request built from the catalog,
/// direct OpenRTB ingress keeps the caller's request and only has
/// defaults normalized onto it
pub struct BuildRequestTask;

fn media_for(placement: &Placement, context: &AuctionContext, imp: &mut Imp) {
    match placement.ad_type {
        AdType::Banner => {
            imp.banner = Some(Banner {
                w: Some(placement.width),
                h: Some(placement.height),
                format: placement
                    .formats
                    .iter()
                    .map(|size| Format {
                        w: size.w,
                        h: size.h,
                    })
                    .collect(),
                pos: None,
            });
        }
        AdType::Video => {
            let settings = placement.video.clone().unwrap_or_default();
            let (w, h) = match context.request.size() {
                Some(size) => (size.w, size.h),
                None => (placement.width, placement.height),
            };

            imp.video = Some(Video {
                mimes: settings.mimes,
                minduration: Some(settings.min_duration),
                maxduration: Some(settings.max_duration),
                protocols: settings.protocols,
                w: (w > 0).then_some(w),
                h: (h > 0).then_some(h),
                startdelay: Some(settings.start_delay),
                linearity: Some(settings.linearity),
                playbackmethod: settings.playback_methods,
                api: settings.apis,
            });
        }
        AdType::Audio => {
            imp.audio = Some(Audio {
                mimes: vec!["audio/mp4".to_string(), "audio/mpeg".to_string()],
                minduration: Some(5),
                maxduration: Some(30),
            });
        }
        AdType::Native => {
            imp.native = Some(Native {
                request: "{\"ver\":\"1.2\"}".to_string(),
                ver: Some("1.2".to_string()),
            });
        }
    }
}

impl BuildRequestTask {
    fn build_fresh(&self, context: &AuctionContext) -> Result<BidRequest, Error> {
        let resolved = context
            .resolved
            .get()
            .ok_or_else(|| anyhow!("builder ran before catalog lookup"))?;
        let floor = *context
            .floor
            .get()
            .ok_or_else(|| anyhow!("builder ran before floors"))?;

        let placement = &resolved.placement;
        let request = &context.request;

        let mut imp = Imp {
            id: Uuid::new_v4().to_string(),
            tagid: Some(placement.id.clone()),
            bidfloor: floor,
            bidfloorcur: Some("USD".to_string()),
            secure: Some(1),
            ..Default::default()
        };

        media_for(placement, context, &mut imp);

        if let Some(deal_id) = &request.deal_id {
            let deal_floor = *context
                .deal_floor
                .get()
                .ok_or_else(|| anyhow!("deal floor missing"))?;

            imp.pmp = Some(Pmp {
                private_auction: Some(1),
                deals: vec![Deal {
                    id: deal_id.clone(),
                    bidfloor: deal_floor,
                    bidfloorcur: Some("USD".to_string()),
                    ..Default::default()
                }],
            });
        }

        let site = Site {
            id: Some(resolved.site.id.clone()),
            name: Some(resolved.site.name.clone()),
            domain: Some(resolved.site.domain.clone()),
            cat: resolved.site.categories.clone(),
            page: request
                .page_url
                .clone()
                .or_else(|| resolved.site.page_url.clone()),
            ref_: request.referer.clone(),
            publisher: Some(Publisher {
                id: Some(resolved.publisher.id.clone()),
                name: Some(resolved.publisher.name.clone()),
                domain: Some(resolved.publisher.domain.clone()),
            }),
        };

        let device = Device {
            ua: request.ua.clone(),
            ip: request.ip.clone(),
            ifa: request.device_ifa.clone(),
            devicetype: request.content.is_some().then_some(3),
            geo: request.geo_country.as_ref().map(|country| Geo {
                country: Some(country.clone()),
                region: None,
            }),
        };

        Ok(BidRequest {
            id: context.auction_id.clone(),
            imp: vec![imp],
            site: Some(site),
            device: Some(device),
            at: Some(AUCTION_TYPE_SECOND_PRICE),
            tmax: Some(context.default_tmax.as_millis() as u64),
            cur: vec!["USD".to_string()],
            bcat: placement.bcat.clone(),
            badv: placement.badv.clone(),
            source: Some(Source {
                fd: Some(1),
                tid: Some(Uuid::new_v4().to_string()),
                ext: None,
            }),
            ..Default::default()
        })
    }

    /// Direct OpenRTB ingress: keep the caller's request, fill the
    /// gaps the spec defaults (`tmax`, `at`, currency, floor)
    fn normalize_inbound(&self, context: &AuctionContext, req: &mut BidRequest) -> Result<(), Error> {
        let floor = *context
            .floor
            .get()
            .ok_or_else(|| anyhow!("builder ran before floors"))?;

        if req.imp.is_empty() {
            bail!("inbound bid request carries no impression");
        }

        if req.id.is_empty() {
            req.id = context.auction_id.clone();
        }

        req.at.get_or_insert(AUCTION_TYPE_SECOND_PRICE);
        req.tmax
            .get_or_insert(context.default_tmax.as_millis() as u64);

        if req.cur.is_empty() {
            req.cur = vec!["USD".to_string()];
        }

        let resolved = context
            .resolved
            .get()
            .ok_or_else(|| anyhow!("builder ran before catalog lookup"))?;

        let imp = &mut req.imp[0];
        imp.tagid
            .get_or_insert_with(|| resolved.placement.id.clone());
        imp.secure.get_or_insert(1);

        if imp.bidfloor < floor {
            imp.bidfloor = floor;
        }
        imp.bidfloorcur.get_or_insert_with(|| "USD".to_string());

        if req.source.is_none() {
            req.source = Some(Source {
                fd: Some(1),
                tid: Some(Uuid::new_v4().to_string()),
                ext: None,
            });
        }

        Ok(())
    }
}

impl BlockingTask<AuctionContext, Error> for BuildRequestTask {
    fn run(&self, context: &AuctionContext) -> Result<(), Error> {
        let mut guard = context.bid_request.write();

        match guard.as_mut() {
            Some(inbound) => self.normalize_inbound(context, inbound)?,
            None => *guard = Some(self.build_fresh(context)?),
        }

        let req = guard.as_ref().ok_or_else(|| anyhow!("no bid request built"))?;

        context
            .tmax
            .set(Duration::from_millis(
                req.tmax.unwrap_or(context.default_tmax.as_millis() as u64),
            ))
            .map_err(|_| anyhow!("tmax already set"))?;

        context
            .auction_type
            .set(req.at.unwrap_or(AUCTION_TYPE_SECOND_PRICE))
            .map_err(|_| anyhow!("auction type already set"))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::auction::tasks::floors::FloorsTask;
    use crate::core::catalog::{testutil, Catalog};
    use crate::core::models::adrequest::{AdRequest, CtvContent, Ingress};
    use crate::core::models::placement::{AdType, VideoSettings};

    fn build_context(request: AdRequest, video: bool) -> AuctionContext {
        let mut doc = testutil::sample_document();
        if video {
            doc.placements[0].ad_type = AdType::Video;
            doc.placements[0].video = Some(VideoSettings::default());
        }
        let catalog = Catalog::from_document(doc);

        let context = AuctionContext::new(request, None, Duration::from_millis(120));
        context
            .resolved
            .set(catalog.resolve("plc-1").unwrap())
            .ok()
            .unwrap();
        FloorsTask::new(0.01).run(&context).unwrap();

        context
    }

    fn banner_request() -> AdRequest {
        AdRequest {
            placement_id: "plc-1".into(),
            page_url: Some("https://news.example.com/story".into()),
            referer: Some("https://search.example".into()),
            ua: Some("Mozilla/5.0".into()),
            ip: Some("203.0.113.9".into()),
            ..Default::default()
        }
    }

    #[test]
    fn builds_the_canonical_banner_request() {
        let context = build_context(banner_request(), false);
        BuildRequestTask.run(&context).unwrap();

        let guard = context.bid_request.read();
        let req = guard.as_ref().unwrap();

        assert_eq!(req.id, context.auction_id);
        assert_eq!(req.at, Some(2));
        assert_eq!(req.tmax, Some(120));
        assert_eq!(req.cur, vec!["USD".to_string()]);

        let imp = &req.imp[0];
        assert_eq!(imp.tagid.as_deref(), Some("plc-1"));
        assert_eq!(imp.secure, Some(1));
        assert_eq!(imp.bidfloor, 0.5);
        assert_eq!(imp.bidfloorcur.as_deref(), Some("USD"));

        let banner = imp.banner.as_ref().unwrap();
        assert_eq!(banner.w, Some(728));
        assert_eq!(banner.h, Some(90));
        assert!(imp.video.is_none());

        let site = req.site.as_ref().unwrap();
        assert_eq!(site.page.as_deref(), Some("https://news.example.com/story"));
        assert_eq!(
            site.publisher.as_ref().unwrap().id.as_deref(),
            Some("pub-1")
        );

        let source = req.source.as_ref().unwrap();
        assert_eq!(source.fd, Some(1));
        assert!(source.tid.is_some());
    }

    #[test]
    fn video_placement_gets_video_object_with_defaults() {
        let mut request = banner_request();
        request.w = Some(1920);
        request.h = Some(1080);
        request.content = Some(CtvContent {
            id: "content-1".into(),
            ..Default::default()
        });

        let context = build_context(request, true);
        BuildRequestTask.run(&context).unwrap();

        let guard = context.bid_request.read();
        let req = guard.as_ref().unwrap();
        let video = req.imp[0].video.as_ref().unwrap();

        assert_eq!(
            video.mimes,
            vec!["video/mp4".to_string(), "video/webm".to_string()]
        );
        assert_eq!(video.minduration, Some(5));
        assert_eq!(video.maxduration, Some(30));
        assert_eq!(video.protocols, vec![2, 3, 5, 6]);
        assert_eq!(video.linearity, Some(1));
        assert_eq!(video.w, Some(1920));
        assert_eq!(video.h, Some(1080));

        assert_eq!(req.device.as_ref().unwrap().devicetype, Some(3));
    }

    #[test]
    fn deal_request_carries_the_pmp_block() {
        let mut request = banner_request();
        request.deal_id = Some("PMP-2024-001".into());
        request.floor = Some(2.0);

        let context = build_context(request, false);
        BuildRequestTask.run(&context).unwrap();

        let guard = context.bid_request.read();
        let pmp = guard.as_ref().unwrap().imp[0].pmp.as_ref().unwrap();

        assert_eq!(pmp.private_auction, Some(1));
        assert_eq!(pmp.deals[0].id, "PMP-2024-001");
        assert_eq!(pmp.deals[0].bidfloor, 2.0);
    }

    #[test]
    fn no_deal_means_no_pmp_block() {
        let context = build_context(banner_request(), false);
        BuildRequestTask.run(&context).unwrap();

        let guard = context.bid_request.read();
        assert!(guard.as_ref().unwrap().imp[0].pmp.is_none());
    }

    #[test]
    fn inbound_openrtb_only_gets_defaults_filled() {
        let inbound = BidRequest {
            id: "caller-id".into(),
            imp: vec![Imp {
                id: "imp-7".into(),
                bidfloor: 0.05,
                ..Default::default()
            }],
            ..Default::default()
        };

        let mut request = banner_request();
        request.ingress = Ingress::OpenRtb;

        let mut doc = testutil::sample_document();
        doc.placements[0].floor_price = 0.5;
        let catalog = Catalog::from_document(doc);

        let context = AuctionContext::new(request, Some(inbound), Duration::from_millis(120));
        context
            .resolved
            .set(catalog.resolve("plc-1").unwrap())
            .ok()
            .unwrap();
        FloorsTask::new(0.01).run(&context).unwrap();

        BuildRequestTask.run(&context).unwrap();

        let guard = context.bid_request.read();
        let req = guard.as_ref().unwrap();

        // caller identity is preserved, defaults are normalized in
        assert_eq!(req.id, "caller-id");
        assert_eq!(req.imp[0].id, "imp-7");
        assert_eq!(req.at, Some(2));
        assert_eq!(req.tmax, Some(120));
        // the placement floor overrides the lower caller floor
        assert_eq!(req.imp[0].bidfloor, 0.5);
        assert_eq!(*context.tmax.get().unwrap(), Duration::from_millis(120));
    }

    #[test]
    fn inbound_without_impressions_is_an_internal_error() {
        let inbound = BidRequest {
            id: "caller-id".into(),
            ..Default::default()
        };

        let context = AuctionContext::new(banner_request(), Some(inbound), Duration::from_millis(120));
        let catalog = Catalog::from_document(testutil::sample_document());
        context
            .resolved
            .set(catalog.resolve("plc-1").unwrap())
            .ok()
            .unwrap();
        FloorsTask::new(0.01).run(&context).unwrap();

        assert!(BuildRequestTask.run(&context).is_err());
    }
}
