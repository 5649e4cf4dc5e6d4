//! Merge and consolidation of postings from all sources.
//!
//! Fixed pipeline: concatenate, re-apply the US filter, drop stale postings,
//! remove exact duplicates, then consolidate same-role postings that differ
//! only by location into one record with a combined location list.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::location::LocationClassifier;
use crate::models::{JobStats, Posting};
use crate::utils::date;

/// Merge postings from the three platforms into the final deduplicated set.
///
/// Deterministic for identical inputs and classifier cache state. `now` is
/// injected so the recency window is testable.
pub fn merge(
    ashby: Vec<Posting>,
    greenhouse: Vec<Posting>,
    lever: Vec<Posting>,
    classifier: &LocationClassifier,
    now: NaiveDate,
    max_age_days: i64,
) -> Vec<Posting> {
    log::info!(
        "Merging {} Ashby, {} Greenhouse and {} Lever postings",
        ashby.len(),
        greenhouse.len(),
        lever.len()
    );

    let mut all_postings = ashby;
    all_postings.extend(greenhouse);
    all_postings.extend(lever);

    let us_postings = filter_us(all_postings, classifier);
    let recent_postings = filter_recent(us_postings, now, max_age_days);
    let unique_postings = dedup(recent_postings);
    let final_postings = consolidate(unique_postings);

    log::info!(
        "Final result: {} unique recent US postings",
        final_postings.len()
    );
    final_postings
}

/// Re-apply US classification via the synchronous pattern path.
fn filter_us(postings: Vec<Posting>, classifier: &LocationClassifier) -> Vec<Posting> {
    let mut stats = JobStats::default();
    let mut us_postings = Vec::new();

    for posting in postings {
        if classifier.classify_sync(&posting.location) {
            stats.add_us();
            us_postings.push(posting);
        } else {
            stats.add_non_us(posting.location.clone());
        }
    }

    stats.log("Location filtering");
    us_postings
}

/// Keep postings published within the window; ambiguous dates are kept.
fn filter_recent(postings: Vec<Posting>, now: NaiveDate, max_age_days: i64) -> Vec<Posting> {
    let total = postings.len();
    let mut recent = Vec::new();
    let mut stale = Vec::new();

    for posting in postings {
        if date::is_recent(&posting.published_date, now, max_age_days) {
            recent.push(posting);
        } else {
            stale.push(posting);
        }
    }

    log::info!("Date filtering statistics:");
    log::info!("  Total postings: {total}");
    log::info!("  Recent postings: {}", recent.len());
    log::info!("  Stale postings: {}", stale.len());
    if !stale.is_empty() {
        let details: Vec<String> = stale
            .iter()
            .map(|p| {
                format!(
                    "{} at {} ({})",
                    p.role_name, p.company_name, p.published_date
                )
            })
            .collect();
        log::info!("  Filtered stale postings: {}", details.join("; "));
    }

    recent
}

/// Drop exact duplicates, keeping the first occurrence in input order.
fn dedup(postings: Vec<Posting>) -> Vec<Posting> {
    let total = postings.len();
    let mut seen = HashSet::new();
    let mut unique = Vec::new();

    for posting in postings {
        if seen.insert(posting.dedup_key()) {
            unique.push(posting);
        }
    }

    let removed = total - unique.len();
    if removed > 0 {
        log::info!("Removed {removed} duplicate postings ({total} -> {})", unique.len());
    } else {
        log::info!("No duplicates found ({total} postings)");
    }
    unique
}

/// Collapse same-company, same-role postings into one record whose location
/// is the sorted `"; "`-join of the group's distinct locations.
fn consolidate(postings: Vec<Posting>) -> Vec<Posting> {
    let mut key_order = Vec::new();
    let mut groups: HashMap<String, Vec<Posting>> = HashMap::new();
    for posting in postings {
        let key = posting.consolidation_key();
        if !groups.contains_key(&key) {
            key_order.push(key.clone());
        }
        groups.entry(key).or_default().push(posting);
    }

    let mut consolidated = Vec::new();
    for key in key_order {
        let Some(mut group) = groups.remove(&key) else {
            continue;
        };
        if group.len() == 1 {
            consolidated.extend(group);
            continue;
        }

        group.sort_by(|a, b| a.location.cmp(&b.location));

        let mut locations: Vec<String> = Vec::new();
        let mut links: Vec<String> = Vec::new();
        for posting in &group {
            let location = posting.location.trim();
            if !location.is_empty() && !locations.iter().any(|l| l == location) {
                locations.push(location.to_string());
            }
            let link = posting.job_link.trim();
            if !link.is_empty() && !links.iter().any(|l| l == link) {
                links.push(link.to_string());
            }
        }

        let mut base = group.remove(0);
        base.location = locations.join("; ");
        // Only the first link survives; the others point at the same role.
        if let Some(link) = links.first() {
            base.job_link = link.clone();
        }

        log::info!(
            "Consolidated {} postings for '{}' at {} -> locations: {}",
            group.len() + 1,
            base.role_name,
            base.company_name,
            base.location
        );
        consolidated.push(base);
    }

    consolidated
}
