//! Bar exam subjects
//!
//! The seven MBE subjects plus the additional MEE essay subjects. Parsing
//! accepts display names, slugs and the abbreviations people actually type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Subject {
    CivilProcedure,
    ConstitutionalLaw,
    Contracts,
    CriminalLaw,
    Evidence,
    RealProperty,
    Torts,
    BusinessAssociations,
    ConflictOfLaws,
    FamilyLaw,
    SecuredTransactions,
    TrustsAndEstates,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown subject: {0}")]
pub struct UnknownSubject(pub String);

impl Subject {
    pub const ALL: [Subject; 12] = [
        Subject::CivilProcedure,
        Subject::ConstitutionalLaw,
        Subject::Contracts,
        Subject::CriminalLaw,
        Subject::Evidence,
        Subject::RealProperty,
        Subject::Torts,
        Subject::BusinessAssociations,
        Subject::ConflictOfLaws,
        Subject::FamilyLaw,
        Subject::SecuredTransactions,
        Subject::TrustsAndEstates,
    ];

    pub const MBE: [Subject; 7] = [
        Subject::CivilProcedure,
        Subject::ConstitutionalLaw,
        Subject::Contracts,
        Subject::CriminalLaw,
        Subject::Evidence,
        Subject::RealProperty,
        Subject::Torts,
    ];

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            Subject::CivilProcedure => "Civil Procedure",
            Subject::ConstitutionalLaw => "Constitutional Law",
            Subject::Contracts => "Contracts",
            Subject::CriminalLaw => "Criminal Law & Procedure",
            Subject::Evidence => "Evidence",
            Subject::RealProperty => "Real Property",
            Subject::Torts => "Torts",
            Subject::BusinessAssociations => "Business Associations",
            Subject::ConflictOfLaws => "Conflict of Laws",
            Subject::FamilyLaw => "Family Law",
            Subject::SecuredTransactions => "Secured Transactions",
            Subject::TrustsAndEstates => "Trusts & Estates",
        }
    }

    /// Stable identifier used in the database and in JSONL files
    pub fn slug(self) -> &'static str {
        match self {
            Subject::CivilProcedure => "civil-procedure",
            Subject::ConstitutionalLaw => "constitutional-law",
            Subject::Contracts => "contracts",
            Subject::CriminalLaw => "criminal-law",
            Subject::Evidence => "evidence",
            Subject::RealProperty => "real-property",
            Subject::Torts => "torts",
            Subject::BusinessAssociations => "business-associations",
            Subject::ConflictOfLaws => "conflict-of-laws",
            Subject::FamilyLaw => "family-law",
            Subject::SecuredTransactions => "secured-transactions",
            Subject::TrustsAndEstates => "trusts-and-estates",
        }
    }

    /// Whether the subject is tested on the multiple-choice MBE
    pub fn is_mbe(self) -> bool {
        Self::MBE.contains(&self)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Subject {
    type Err = UnknownSubject;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Normalize "Criminal Law & Procedure", "criminal_law", "CRIMINAL-LAW" alike
        let key: String = s
            .trim()
            .to_lowercase()
            .replace('&', "and")
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();

        let subject = match key.as_str() {
            "civilprocedure" | "civpro" | "civproc" | "cp" => Subject::CivilProcedure,
            "constitutionallaw" | "conlaw" | "con" | "constitutional" => {
                Subject::ConstitutionalLaw
            }
            "contracts" | "contract" | "k" | "ucc2" | "sales" => Subject::Contracts,
            "criminallaw" | "criminallawandprocedure" | "criminalprocedure" | "crim"
            | "crimlaw" | "crimpro" => Subject::CriminalLaw,
            "evidence" | "evid" | "ev" => Subject::Evidence,
            "realproperty" | "property" | "prop" | "rp" => Subject::RealProperty,
            "torts" | "tort" => Subject::Torts,
            "businessassociations" | "ba" | "corporations" | "agency" | "partnership" => {
                Subject::BusinessAssociations
            }
            "conflictoflaws" | "conflicts" | "col" => Subject::ConflictOfLaws,
            "familylaw" | "family" | "fam" => Subject::FamilyLaw,
            "securedtransactions" | "secured" | "ucc9" | "st" => Subject::SecuredTransactions,
            "trustsandestates" | "trusts" | "wills" | "willsandtrusts" | "te" | "estates" => {
                Subject::TrustsAndEstates
            }
            _ => return Err(UnknownSubject(s.trim().to_string())),
        };

        Ok(subject)
    }
}
