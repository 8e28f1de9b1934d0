//! Built-in concepts
//!
//! High-yield black-letter rules, grouped by subject. Ids are stable because
//! review progress is keyed on them.

use super::models::{ConceptProgress, KnowledgeNode};
use crate::subjects::Subject;

struct Builtin {
    id: &'static str,
    name: &'static str,
    subject: Subject,
    difficulty: u8,
    rule: &'static str,
    elements: &'static [&'static str],
    exceptions: &'static [&'static str],
    traps: &'static [&'static str],
}

const BUILTINS: &[Builtin] = &[
    // ===== Civil Procedure =====
    Builtin {
        id: "civpro-diversity",
        name: "Diversity Jurisdiction",
        subject: Subject::CivilProcedure,
        difficulty: 2,
        rule: "Federal courts have subject-matter jurisdiction over suits between citizens of different states where the amount in controversy exceeds $75,000.",
        elements: &[
            "Complete diversity: no plaintiff shares citizenship with any defendant",
            "Amount in controversy exceeds $75,000, exclusive of interest and costs",
            "Citizenship measured when the complaint is filed",
        ],
        exceptions: &[
            "Domestic relations and probate matters are excluded",
            "Aggregation allowed only for one plaintiff against one defendant",
        ],
        traps: &[
            "A corporation is a citizen of its state of incorporation AND principal place of business",
            "Exactly $75,000 is not enough",
        ],
    },
    Builtin {
        id: "civpro-personal-jurisdiction",
        name: "Personal Jurisdiction",
        subject: Subject::CivilProcedure,
        difficulty: 3,
        rule: "A court may exercise jurisdiction over a defendant who has minimum contacts with the forum such that suit does not offend traditional notions of fair play and substantial justice.",
        elements: &[
            "Statutory authorization (long-arm statute)",
            "Purposeful availment of the forum",
            "Relatedness of the claim to the contacts",
            "Fairness factors: burden, forum interest, plaintiff interest",
        ],
        exceptions: &[
            "General jurisdiction where the defendant is 'at home'",
            "Tag jurisdiction by in-state service on an individual",
        ],
        traps: &[
            "Foreseeability alone is not purposeful availment",
            "Consent and waiver by failing to object in the first response",
        ],
    },
    Builtin {
        id: "civpro-erie",
        name: "Erie Doctrine",
        subject: Subject::CivilProcedure,
        difficulty: 4,
        rule: "A federal court sitting in diversity applies state substantive law and federal procedural law.",
        elements: &[
            "Valid Federal Rule on point controls",
            "Otherwise ask whether ignoring state law is outcome-determinative",
            "Weigh the twin aims: forum shopping and inequitable administration",
        ],
        exceptions: &["Strong countervailing federal interests (Byrd balancing)"],
        traps: &[
            "Statutes of limitations, choice-of-law rules and elements of claims are substantive",
        ],
    },
    // ===== Constitutional Law =====
    Builtin {
        id: "conlaw-standing",
        name: "Standing",
        subject: Subject::ConstitutionalLaw,
        difficulty: 2,
        rule: "A plaintiff must show a concrete and particularized injury, fairly traceable to the defendant, that a favorable decision is likely to redress.",
        elements: &["Injury in fact", "Causation", "Redressability"],
        exceptions: &[
            "Taxpayer standing for Establishment Clause spending challenges",
            "Organizational standing for members' injuries",
        ],
        traps: &["Generalized grievances shared by all citizens do not confer standing"],
    },
    Builtin {
        id: "conlaw-dormant-commerce",
        name: "Dormant Commerce Clause",
        subject: Subject::ConstitutionalLaw,
        difficulty: 4,
        rule: "States may not discriminate against or unduly burden interstate commerce.",
        elements: &[
            "Facially discriminatory laws are invalid unless necessary to an important non-economic interest",
            "Neutral laws fail if the burden clearly exceeds local benefits",
        ],
        exceptions: &["Market participant exception", "Congressional authorization"],
        traps: &["The Privileges and Immunities Clause protects only individual citizens, not corporations"],
    },
    Builtin {
        id: "conlaw-levels-of-scrutiny",
        name: "Levels of Scrutiny",
        subject: Subject::ConstitutionalLaw,
        difficulty: 3,
        rule: "Equal protection and due process challenges are reviewed under strict scrutiny, intermediate scrutiny or rational basis depending on the classification or right involved.",
        elements: &[
            "Strict: compelling interest, narrowly tailored (race, national origin, fundamental rights)",
            "Intermediate: important interest, substantially related (gender, legitimacy)",
            "Rational basis: legitimate interest, rationally related (everything else)",
        ],
        exceptions: &["Alienage classifications by Congress get rational basis"],
        traps: &["Burden of proof shifts to the government under strict and intermediate scrutiny"],
    },
    // ===== Contracts =====
    Builtin {
        id: "contracts-mailbox-rule",
        name: "Mailbox Rule",
        subject: Subject::Contracts,
        difficulty: 2,
        rule: "An acceptance is effective upon dispatch if sent by a reasonable means.",
        elements: &["Properly addressed", "Reasonable medium", "Out of the offeree's control"],
        exceptions: &[
            "Option contracts: acceptance effective on receipt",
            "Offer stipulates acceptance must be received",
            "Rejection sent first, then acceptance: first to arrive controls",
        ],
        traps: &["Revocations and rejections are effective only on receipt"],
    },
    Builtin {
        id: "contracts-statute-of-frauds",
        name: "Statute of Frauds",
        subject: Subject::Contracts,
        difficulty: 3,
        rule: "Certain contracts are unenforceable unless evidenced by a writing signed by the party to be charged.",
        elements: &[
            "Marriage, suretyship, land, one-year, UCC goods $500 or more, executor promises",
            "Writing with essential terms signed by the defendant",
        ],
        exceptions: &[
            "Part performance for land sales",
            "Merchant's confirmation under UCC 2-201(2)",
            "Specially manufactured goods and admissions",
        ],
        traps: &["The one-year rule asks whether performance is possible within a year, not likely"],
    },
    Builtin {
        id: "contracts-parol-evidence",
        name: "Parol Evidence Rule",
        subject: Subject::Contracts,
        difficulty: 4,
        rule: "Extrinsic evidence of prior or contemporaneous agreements may not contradict a fully integrated writing or vary a partially integrated one.",
        elements: &["Determine integration", "Classify the evidence as contradicting or supplementing"],
        exceptions: &[
            "Formation defects: fraud, duress, mistake",
            "Conditions precedent to effectiveness",
            "Interpreting ambiguous terms",
        ],
        traps: &["Subsequent modifications are never barred by the parol evidence rule"],
    },
    // ===== Criminal Law & Procedure =====
    Builtin {
        id: "crim-murder",
        name: "Common Law Murder",
        subject: Subject::CriminalLaw,
        difficulty: 3,
        rule: "Murder is the unlawful killing of another human being with malice aforethought.",
        elements: &[
            "Intent to kill",
            "Intent to inflict serious bodily harm",
            "Depraved heart (reckless indifference)",
            "Felony murder (BARRK felonies)",
        ],
        exceptions: &["Adequate provocation reduces to voluntary manslaughter"],
        traps: &["Felony murder does not apply to the death of a co-felon in most jurisdictions"],
    },
    Builtin {
        id: "crim-fourth-amendment",
        name: "Fourth Amendment Searches",
        subject: Subject::CriminalLaw,
        difficulty: 4,
        rule: "Government searches of areas where a person has a reasonable expectation of privacy require a warrant supported by probable cause unless an exception applies.",
        elements: &["Government conduct", "Reasonable expectation of privacy or physical trespass", "Warrant or exception"],
        exceptions: &[
            "Search incident to arrest",
            "Automobile exception",
            "Plain view",
            "Consent",
            "Exigent circumstances",
        ],
        traps: &["Open fields and items exposed to the public carry no expectation of privacy"],
    },
    Builtin {
        id: "crim-miranda",
        name: "Miranda Warnings",
        subject: Subject::CriminalLaw,
        difficulty: 3,
        rule: "Statements from custodial interrogation are inadmissible unless the suspect was warned of the right to silence and counsel and waived them.",
        elements: &["Custody", "Interrogation", "Warnings", "Knowing and voluntary waiver"],
        exceptions: &["Public safety exception", "Impeachment use of voluntary statements"],
        traps: &["Invoking counsel must be unambiguous; silence alone is not invocation"],
    },
    // ===== Evidence =====
    Builtin {
        id: "evidence-hearsay",
        name: "Hearsay",
        subject: Subject::Evidence,
        difficulty: 3,
        rule: "Hearsay is an out-of-court statement offered to prove the truth of the matter asserted, and is inadmissible unless an exemption or exception applies.",
        elements: &["Statement", "Made out of court", "Offered for its truth"],
        exceptions: &[
            "Opposing party statements (exemption)",
            "Present sense impression and excited utterance",
            "Business and public records",
            "Dying declarations and statements against interest (declarant unavailable)",
        ],
        traps: &["Statements offered for effect on the listener or verbal acts are not hearsay"],
    },
    Builtin {
        id: "evidence-character",
        name: "Character Evidence",
        subject: Subject::Evidence,
        difficulty: 4,
        rule: "Evidence of a person's character is inadmissible to prove conduct in conformity on a particular occasion.",
        elements: &["Identify the purpose of the evidence", "Check for a criminal-defendant door-opening"],
        exceptions: &[
            "Accused may offer a pertinent trait (reputation or opinion)",
            "MIMIC purposes for other acts under FRE 404(b)",
            "Prior sexual assault in sexual assault cases",
        ],
        traps: &["Specific instances are allowed only on cross or when character is an element"],
    },
    Builtin {
        id: "evidence-impeachment",
        name: "Impeachment",
        subject: Subject::Evidence,
        difficulty: 3,
        rule: "A witness's credibility may be attacked by bias, prior inconsistent statements, convictions, untruthful acts, sensory defects or contradiction.",
        elements: &["Bias is never collateral", "Convictions under FRE 609 balancing"],
        exceptions: &["Crimes of dishonesty are automatically admissible regardless of punishment"],
        traps: &["Extrinsic evidence of specific untruthful acts is not allowed"],
    },
    // ===== Real Property =====
    Builtin {
        id: "property-rap",
        name: "Rule Against Perpetuities",
        subject: Subject::RealProperty,
        difficulty: 5,
        rule: "No interest is good unless it must vest, if at all, not later than 21 years after some life in being at the creation of the interest.",
        elements: &[
            "Identify contingent remainders, executory interests and class gifts",
            "Find a measuring life",
            "Ask whether any possibility of remote vesting exists",
        ],
        exceptions: &["Charity-to-charity gifts", "Wait-and-see and USRAP reforms"],
        traps: &["Fertile octogenarian and unborn widow scenarios"],
    },
    Builtin {
        id: "property-recording-acts",
        name: "Recording Acts",
        subject: Subject::RealProperty,
        difficulty: 4,
        rule: "Recording statutes protect subsequent bona fide purchasers against prior unrecorded interests.",
        elements: &["Race, notice or race-notice statute", "Value paid", "No notice (actual, constructive, inquiry)"],
        exceptions: &["Shelter rule protects transferees of a BFP"],
        traps: &["Donees and heirs are not purchasers for value"],
    },
    Builtin {
        id: "property-adverse-possession",
        name: "Adverse Possession",
        subject: Subject::RealProperty,
        difficulty: 2,
        rule: "Title passes to one who possesses land for the statutory period in a manner that is continuous, open, exclusive and hostile.",
        elements: &["Continuous", "Open and notorious", "Actual and exclusive", "Hostile"],
        exceptions: &["Tacking between privies", "Disability of the true owner at the start tolls the period"],
        traps: &["Permission defeats hostility; co-tenants require ouster"],
    },
    // ===== Torts =====
    Builtin {
        id: "torts-negligence",
        name: "Negligence",
        subject: Subject::Torts,
        difficulty: 2,
        rule: "A defendant is liable for negligence when a breach of a duty of reasonable care actually and proximately causes damages.",
        elements: &["Duty", "Breach", "Actual cause", "Proximate cause", "Damages"],
        exceptions: &["No general duty to rescue absent a special relationship"],
        traps: &["Intervening criminal acts are foreseeable when the risk was the reason for the duty"],
    },
    Builtin {
        id: "torts-strict-products",
        name: "Strict Products Liability",
        subject: Subject::Torts,
        difficulty: 3,
        rule: "A commercial seller is strictly liable for injuries caused by a product that was defective when it left the seller's control.",
        elements: &[
            "Commercial supplier",
            "Manufacturing, design or warning defect",
            "Defect existed when product left defendant's control",
            "Causation and damages",
        ],
        exceptions: &["Substantial alteration", "Misuse that is not foreseeable"],
        traps: &["Privity is not required; bystanders can recover"],
    },
    Builtin {
        id: "torts-defamation",
        name: "Defamation",
        subject: Subject::Torts,
        difficulty: 4,
        rule: "Publication of a false defamatory statement of fact about the plaintiff that causes reputational harm is actionable, subject to constitutional fault limits.",
        elements: &["Defamatory statement", "Of and concerning plaintiff", "Publication", "Damages", "Falsity and fault on matters of public concern"],
        exceptions: &["Truth", "Absolute and qualified privileges"],
        traps: &["Public figures must prove actual malice by clear and convincing evidence"],
    },
    // ===== Essay subjects =====
    Builtin {
        id: "ba-business-judgment",
        name: "Business Judgment Rule",
        subject: Subject::BusinessAssociations,
        difficulty: 3,
        rule: "Directors are presumed to act in good faith, on an informed basis, and in the honest belief that the action is in the corporation's best interest.",
        elements: &["Informed decision", "Good faith", "No conflict of interest"],
        exceptions: &["Self-dealing triggers duty of loyalty review", "Waste and bad faith"],
        traps: &["The rule does not protect uninformed decisions (Van Gorkom)"],
    },
    Builtin {
        id: "conflicts-most-significant-relationship",
        name: "Most Significant Relationship",
        subject: Subject::ConflictOfLaws,
        difficulty: 4,
        rule: "Under the Second Restatement, the law of the state with the most significant relationship to the occurrence and parties governs.",
        elements: &["Place of injury", "Place of conduct", "Domicile of parties", "Center of the relationship"],
        exceptions: &["Forum public policy", "Procedural matters use forum law"],
        traps: &["Depecage: different issues may be governed by different states' law"],
    },
    Builtin {
        id: "family-child-custody",
        name: "Best Interests of the Child",
        subject: Subject::FamilyLaw,
        difficulty: 2,
        rule: "Custody is awarded according to the best interests of the child.",
        elements: &["Child's wishes", "Parental stability", "Primary caretaker", "Domestic violence"],
        exceptions: &["UCCJEA home-state jurisdiction limits which court decides"],
        traps: &["Modification requires a substantial change in circumstances"],
    },
    Builtin {
        id: "secured-attachment",
        name: "Attachment and Perfection",
        subject: Subject::SecuredTransactions,
        difficulty: 4,
        rule: "A security interest attaches when value is given, the debtor has rights in the collateral, and there is an authenticated security agreement or possession; perfection usually requires filing.",
        elements: &["Value", "Rights in collateral", "Security agreement or control/possession", "Filing or other perfection step"],
        exceptions: &["Automatic perfection of PMSI in consumer goods"],
        traps: &["First to file or perfect wins among perfected creditors, not first to attach"],
    },
    Builtin {
        id: "trusts-will-execution",
        name: "Will Execution Formalities",
        subject: Subject::TrustsAndEstates,
        difficulty: 2,
        rule: "A valid attested will must be in writing, signed by the testator, and witnessed by two people.",
        elements: &["Writing", "Testator's signature", "Two witnesses", "Testamentary intent and capacity"],
        exceptions: &["Holographic wills where recognized", "Harmless error doctrine"],
        traps: &["Interested witnesses may forfeit their bequest above their intestate share"],
    },
];

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Create all built-in concepts with fresh progress
pub fn get_builtin_concepts() -> Vec<KnowledgeNode> {
    BUILTINS
        .iter()
        .map(|b| KnowledgeNode {
            id: b.id.to_string(),
            name: b.name.to_string(),
            subject: b.subject,
            difficulty: b.difficulty,
            rule: b.rule.to_string(),
            elements: to_strings(b.elements),
            exceptions: to_strings(b.exceptions),
            common_traps: to_strings(b.traps),
            progress: ConceptProgress::default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_ids_are_unique() {
        let concepts = get_builtin_concepts();
        let ids: HashSet<&str> = concepts.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), concepts.len());
    }

    #[test]
    fn test_every_mbe_subject_has_concepts() {
        let concepts = get_builtin_concepts();
        for subject in Subject::MBE {
            assert!(
                concepts.iter().filter(|c| c.subject == subject).count() >= 3,
                "{} needs at least three concepts",
                subject
            );
        }
    }

    #[test]
    fn test_builtin_fields_are_populated() {
        for concept in get_builtin_concepts() {
            assert!((1..=5).contains(&concept.difficulty), "{}", concept.id);
            assert!(!concept.rule.is_empty());
            assert!(!concept.elements.is_empty());
            assert_eq!(concept.progress, ConceptProgress::default());
        }
    }
}
