//! Links and mechanisms left over from the old wiki site.

use super::{CheckContext, Rule, SourceFile};
use crate::models::Severity;

pub const WIKI_FRAGMENT: &str = "index.php";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkKind {
    Policy,
    SpeakerAgreement,
    Membership,
}

struct LegacyLink {
    fragment: &'static str,
    label: &'static str,
    kind: LinkKind,
    severity: Severity,
}

const LEGACY_LINKS: &[LegacyLink] = &[
    LegacyLink {
        fragment: "Speaker_Agreement",
        label: "speaker agreement",
        kind: LinkKind::SpeakerAgreement,
        severity: Severity::High,
    },
    LegacyLink {
        fragment: "Conference_Policies",
        label: "conference policies",
        kind: LinkKind::Policy,
        severity: Severity::High,
    },
    LegacyLink {
        fragment: "Local_Chapter_Supporter",
        label: "local chapter supporter policy",
        kind: LinkKind::Policy,
        severity: Severity::High,
    },
    LegacyLink {
        fragment: "Chapter_Rules",
        label: "chapter rules",
        kind: LinkKind::Policy,
        severity: Severity::High,
    },
    LegacyLink {
        fragment: "Chapter_Handbook",
        label: "chapter handbook",
        kind: LinkKind::Policy,
        severity: Severity::High,
    },
    LegacyLink {
        fragment: "Chapter_Leader_Handbook",
        label: "chapter leader handbook",
        kind: LinkKind::Policy,
        severity: Severity::High,
    },
    LegacyLink {
        fragment: "index.php/Membership",
        label: "membership",
        kind: LinkKind::Membership,
        severity: Severity::High,
    },
    LegacyLink {
        fragment: "Corporate_Membership",
        label: "corporate membership",
        kind: LinkKind::Membership,
        severity: Severity::High,
    },
    LegacyLink {
        fragment: "Category:OWASP_Project",
        label: "projects",
        kind: LinkKind::Membership,
        severity: Severity::Low,
    },
    LegacyLink {
        fragment: "About_OWASP",
        label: "about OWASP",
        kind: LinkKind::Membership,
        severity: Severity::Low,
    },
];

/// Any old wiki URL.
pub fn check_legacy_wiki(file: &SourceFile<'_>, ctx: &mut CheckContext<'_>) {
    for (n, line) in file.numbered_lines() {
        if line.contains(WIKI_FRAGMENT) {
            ctx.status.legacy_wiki_link = true;
            ctx.report(
                Rule::LegacyWiki.id(),
                Severity::Low,
                file.path,
                Some(n),
                "Old wiki link found",
            );
        }
    }
}

/// PayPal donation buttons predate the current donation flow.
pub fn check_donation(file: &SourceFile<'_>, ctx: &mut CheckContext<'_>) {
    for (n, line) in file.numbered_lines() {
        if line.to_lowercase().contains("paypal") {
            ctx.status.legacy_donation = true;
            ctx.report(
                Rule::LegacyDonation.id(),
                Severity::High,
                file.path,
                Some(n),
                "Legacy PayPal donation mechanism found",
            );
        }
    }
}

/// Old policy, membership, and project links.
pub fn check_legacy_policy(file: &SourceFile<'_>, ctx: &mut CheckContext<'_>) {
    for (n, line) in file.numbered_lines() {
        for link in LEGACY_LINKS.iter().filter(|l| line.contains(l.fragment)) {
            match link.kind {
                LinkKind::SpeakerAgreement => {
                    ctx.status.legacy_speaker_agreement = true;
                    ctx.status.legacy_policy_link = true;
                }
                LinkKind::Policy => ctx.status.legacy_policy_link = true,
                LinkKind::Membership => ctx.status.legacy_membership_link = true,
            }
            ctx.report(
                Rule::LegacyPolicy.id(),
                link.severity,
                file.path,
                Some(n),
                format!("Legacy {} link found", link.label),
            );
        }
    }
}
