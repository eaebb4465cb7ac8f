//! Canonical team table and alias lookups.
//!
//! The table owns four views of the same rows: exact canonical names,
//! book-feed aliases, and the normalized form of each. All keys are
//! lowercase. Construction is checked: an alias may only point at a
//! canonical that exists, and two rows may not claim the same name.
//! The builtin table is a starter set (majors plus the known feed
//! divergences); production swaps in a full table loaded from a file.

use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::normalize::normalize;
use crate::errors::AliasTableError;

/// Seed rows: (canonical name, book-feed aliases the normalizer cannot
/// derive). Canonical names follow the ratings-table style: trailing
/// "St.", leading "N." / "S." / "E." / "W." / "C." directionals.
const BUILTIN_TEAMS: &[(&str, &[&str])] = &[
    // ACC
    ("Duke", &[]),
    ("North Carolina", &["UNC"]),
    ("N.C. St.", &["NC State", "North Carolina State", "N.C. State", "NC St"]),
    ("Virginia", &["UVA"]),
    ("Virginia Tech", &["Va Tech"]),
    ("Wake Forest", &[]),
    ("Miami FL", &["Miami (FL)", "Miami Florida"]),
    ("Florida St.", &["FSU"]),
    ("Clemson", &[]),
    ("Louisville", &[]),
    ("Syracuse", &[]),
    ("Pittsburgh", &["Pitt"]),
    ("Boston College", &[]),
    ("Notre Dame", &[]),
    ("Georgia Tech", &[]),
    // Big Ten
    ("Michigan St.", &[]),
    ("Michigan", &[]),
    ("Ohio St.", &[]),
    ("Purdue", &[]),
    ("Indiana", &[]),
    ("Illinois", &[]),
    ("Wisconsin", &[]),
    ("Iowa", &[]),
    ("Minnesota", &[]),
    ("Penn St.", &[]),
    ("Maryland", &[]),
    ("Rutgers", &[]),
    ("Nebraska", &[]),
    ("Northwestern", &[]),
    ("UCLA", &[]),
    ("USC", &["Southern California", "Southern Cal"]),
    ("Oregon", &[]),
    ("Washington", &[]),
    // Big 12
    ("Kansas", &[]),
    ("Kansas St.", &["K-State"]),
    ("Iowa St.", &[]),
    ("Oklahoma St.", &[]),
    ("Texas Tech", &[]),
    ("Baylor", &[]),
    ("TCU", &["Texas Christian"]),
    ("West Virginia", &["WVU"]),
    ("Cincinnati", &[]),
    ("UCF", &["Central Florida"]),
    ("BYU", &["Brigham Young"]),
    ("Houston", &[]),
    ("Arizona", &[]),
    ("Arizona St.", &[]),
    ("Colorado", &[]),
    ("Utah", &[]),
    // SEC
    ("Kentucky", &[]),
    ("Tennessee", &[]),
    ("Alabama", &[]),
    ("Auburn", &[]),
    ("Florida", &[]),
    ("Georgia", &[]),
    ("LSU", &["Louisiana State"]),
    ("Mississippi", &["Ole Miss"]),
    ("Mississippi St.", &[]),
    ("Arkansas", &[]),
    ("Missouri", &["Mizzou"]),
    ("South Carolina", &[]),
    ("Texas", &[]),
    ("Texas A&M", &[]),
    ("Oklahoma", &[]),
    ("Vanderbilt", &["Vandy"]),
    // Big East
    ("Connecticut", &["UConn"]),
    ("Villanova", &[]),
    ("Creighton", &[]),
    ("Marquette", &[]),
    ("Xavier", &[]),
    ("St. John's", &["St. John's (NY)"]),
    ("Seton Hall", &[]),
    ("Providence", &[]),
    ("Butler", &[]),
    ("Georgetown", &[]),
    ("DePaul", &[]),
    // Mountain West / WCC
    ("Gonzaga", &[]),
    ("St. Mary's", &["Saint Mary's (CA)", "St. Mary's (CA)"]),
    ("San Diego St.", &["SDSU"]),
    ("Nevada", &[]),
    ("UNLV", &["Nevada-Las Vegas"]),
    ("New Mexico", &[]),
    ("Utah St.", &[]),
    ("Boise St.", &[]),
    ("Colorado St.", &[]),
    ("Fresno St.", &[]),
    ("San Jose St.", &[]),
    ("Wyoming", &[]),
    ("Air Force", &[]),
    ("Loyola Marymount", &["LMU"]),
    ("Pepperdine", &[]),
    ("San Francisco", &[]),
    ("Santa Clara", &[]),
    ("Portland", &[]),
    ("San Diego", &[]),
    ("Pacific", &[]),
    // A-10 / American
    ("Memphis", &[]),
    ("Dayton", &[]),
    ("VCU", &["Virginia Commonwealth"]),
    ("St. Louis", &["Saint Louis", "SLU"]),
    ("George Washington", &["GW"]),
    ("Massachusetts", &["UMass"]),
    ("Rhode Island", &["URI"]),
    ("Davidson", &[]),
    ("St. Bonaventure", &[]),
    ("St. Joseph's", &["Saint Joseph's (PA)", "St. Joe's"]),
    ("La Salle", &[]),
    ("Richmond", &[]),
    ("Temple", &[]),
    ("SMU", &["Southern Methodist"]),
    ("Tulane", &[]),
    ("Tulsa", &[]),
    ("East Carolina", &["ECU"]),
    ("South Florida", &["USF"]),
    ("Florida Atlantic", &["FAU"]),
    ("North Texas", &["UNT"]),
    ("UAB", &["Alabama Birmingham", "Alabama-Birmingham"]),
    ("UTEP", &["Texas El Paso", "Texas-El Paso"]),
    ("UTSA", &["Texas San Antonio", "Texas-San Antonio"]),
    ("Wichita St.", &[]),
    // Valley / mid-major
    ("Illinois St.", &["Illinois State"]),
    ("Indiana St.", &[]),
    ("Murray St.", &[]),
    ("Drake", &[]),
    ("Bradley", &[]),
    ("Loyola Chicago", &["Loyola (IL)", "Loyola-Chicago"]),
    ("N. Iowa", &["UNI"]),
    ("S. Illinois", &["SIU"]),
    ("Missouri St.", &[]),
    ("Belmont", &[]),
    ("Valparaiso", &[]),
    // C-USA / Sun Belt
    ("W. Kentucky", &["WKU"]),
    ("Middle Tennessee", &["MTSU"]),
    ("Louisiana Tech", &["LA Tech"]),
    ("Liberty", &[]),
    ("Kennesaw St.", &[]),
    ("Jacksonville St.", &[]),
    ("New Mexico St.", &["NMSU"]),
    ("Sam Houston", &["Sam Houston St.", "Sam Houston State"]),
    ("Appalachian St.", &["App State", "App St."]),
    ("Georgia St.", &[]),
    ("Georgia Southern", &[]),
    ("Texas St.", &[]),
    ("Louisiana", &["Louisiana Lafayette", "UL Lafayette"]),
    ("UL Monroe", &["Louisiana Monroe", "Louisiana-Monroe", "ULM"]),
    ("South Alabama", &[]),
    ("S. Miss", &["Southern Mississippi", "USM"]),
    ("Marshall", &[]),
    ("Old Dominion", &["ODU"]),
    ("James Madison", &["JMU"]),
    ("Coastal Carolina", &[]),
    ("Troy", &[]),
    ("Arkansas St.", &[]),
    ("Little Rock", &["Arkansas Little Rock", "Arkansas-Little Rock", "UALR"]),
    // MAC / Horizon
    ("E. Michigan", &[]),
    ("W. Michigan", &[]),
    ("C. Michigan", &[]),
    ("Ohio", &[]),
    ("Kent St.", &[]),
    ("Akron", &[]),
    ("Toledo", &[]),
    ("Buffalo", &[]),
    ("Ball St.", &[]),
    ("Bowling Green", &[]),
    ("Miami OH", &["Miami (OH)", "Miami (Ohio)", "Miami Ohio"]),
    ("N. Illinois", &["NIU"]),
    ("Oakland", &[]),
    ("Milwaukee", &["Wisconsin-Milwaukee", "Wisconsin Milwaukee"]),
    ("Green Bay", &["Wisconsin-Green Bay", "Wisconsin Green Bay"]),
    ("Cleveland St.", &[]),
    ("Wright St.", &[]),
    ("Youngstown St.", &[]),
    ("N. Kentucky", &["NKU"]),
    ("Purdue Fort Wayne", &["Fort Wayne", "IPFW"]),
    ("Detroit Mercy", &["Detroit"]),
    ("Robert Morris", &[]),
    // Summit / Big Sky / WAC
    ("South Dakota St.", &[]),
    ("North Dakota St.", &["NDSU"]),
    ("South Dakota", &[]),
    ("North Dakota", &[]),
    ("Omaha", &["Nebraska Omaha", "Nebraska-Omaha"]),
    ("Oral Roberts", &["ORU"]),
    ("Denver", &[]),
    ("Kansas City", &["UMKC", "Missouri-Kansas City"]),
    ("St. Thomas", &["St. Thomas (MN)"]),
    ("Weber St.", &[]),
    ("Montana St.", &[]),
    ("Montana", &[]),
    ("E. Washington", &["EWU"]),
    ("Idaho St.", &[]),
    ("Idaho", &[]),
    ("Portland St.", &[]),
    ("Sacramento St.", &["Sac State", "Sac St."]),
    ("N. Arizona", &["NAU"]),
    ("S. Utah", &["SUU"]),
    ("Grand Canyon", &["GCU"]),
    ("California Baptist", &["Cal Baptist", "CBU"]),
    ("Seattle", &["Seattle U"]),
    ("UT Arlington", &["Texas Arlington", "Texas-Arlington"]),
    ("Tarleton St.", &[]),
    ("Utah Valley", &["UVU"]),
    ("Stephen F. Austin", &["SFA"]),
    ("Abilene Christian", &["ACU"]),
    ("Incarnate Word", &["UIW"]),
    ("McNeese St.", &["McNeese"]),
    ("Nicholls St.", &["Nicholls"]),
    ("SE Louisiana", &["Southeastern Louisiana"]),
    ("Northwestern St.", &[]),
    ("SIU Edwardsville", &["SIUE", "Southern Illinois Edwardsville"]),
    // Big West / Pac
    ("California", &["Cal"]),
    ("Stanford", &[]),
    ("Oregon St.", &[]),
    ("Washington St.", &[]),
    ("UC Irvine", &[]),
    ("UC Davis", &[]),
    ("UC Santa Barbara", &["UCSB"]),
    ("UC San Diego", &["UCSD"]),
    ("UC Riverside", &[]),
    ("Cal St. Fullerton", &["Cal State Fullerton", "CSU Fullerton"]),
    ("Cal St. Northridge", &["Cal State Northridge", "CSUN"]),
    ("Cal St. Bakersfield", &["Cal State Bakersfield", "CSU Bakersfield"]),
    ("Long Beach St.", &["CSU Long Beach"]),
    ("Hawaii", &["Hawai'i"]),
    // East coast mid-majors
    ("Vermont", &[]),
    ("UMBC", &["Maryland Baltimore County", "Maryland-Baltimore County"]),
    ("Mount St. Mary's", &["Mount Saint Mary's", "Mt. St. Mary's", "Mt St Mary's"]),
    ("Charleston", &["College of Charleston", "Col Charleston"]),
    ("UNC Wilmington", &["UNCW", "North Carolina Wilmington"]),
    ("UNC Greensboro", &["UNCG", "North Carolina Greensboro"]),
    ("UNC Asheville", &["North Carolina Asheville"]),
    ("Hofstra", &[]),
    ("Drexel", &[]),
    ("Towson", &[]),
    ("Delaware", &[]),
    ("Northeastern", &[]),
    ("Winthrop", &[]),
    ("High Point", &[]),
    ("Longwood", &[]),
    ("Iona", &[]),
    ("Manhattan", &[]),
    ("Quinnipiac", &[]),
    ("Fairfield", &[]),
    ("St. Peter's", &["Saint Peter's"]),
    ("Niagara", &[]),
    ("Siena", &[]),
    ("Colgate", &[]),
    ("Navy", &[]),
    ("Army", &["Army West Point"]),
    ("Princeton", &[]),
    ("Yale", &[]),
    ("Cornell", &[]),
    ("Penn", &["Pennsylvania"]),
    ("Harvard", &[]),
    ("Furman", &[]),
    ("Samford", &[]),
    ("Chattanooga", &["UT Chattanooga", "Tennessee Chattanooga"]),
    ("East Tennessee St.", &["ETSU"]),
    ("E. Kentucky", &["EKU"]),
    ("C. Arkansas", &["UCA"]),
    ("Florida Gulf Coast", &["FGCU"]),
    ("Florida International", &["FIU"]),
    ("Jacksonville", &[]),
    ("North Florida", &["UNF"]),
    ("Stetson", &[]),
    ("Bellarmine", &[]),
    // SWAC / MEAC
    ("Texas Southern", &[]),
    ("Southern", &[]),
    ("Grambling St.", &["Grambling"]),
    ("Norfolk St.", &[]),
    ("Howard", &[]),
    ("S.C. St.", &["South Carolina State", "South Carolina St."]),
    ("N.C. Central", &["North Carolina Central", "NCCU"]),
    ("N.C. A&T", &["North Carolina A&T"]),
];

/// Checked canonical/alias lookup table. All lookups are case and
/// surrounding-whitespace insensitive.
#[derive(Clone, Debug, Default)]
pub struct AliasTable {
    by_exact: FxHashMap<String, String>,
    by_alias: FxHashMap<String, String>,
    by_normalized: FxHashMap<String, Vec<String>>,
    by_normalized_alias: FxHashMap<String, Vec<String>>,
    rows: usize,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared starter table, built once.
    pub fn builtin() -> &'static AliasTable {
        static TABLE: OnceLock<AliasTable> = OnceLock::new();
        TABLE.get_or_init(|| {
            let mut table = AliasTable::new();
            for (canonical, aliases) in BUILTIN_TEAMS {
                if let Err(err) = table.add_canonical(canonical) {
                    tracing::warn!(team = canonical, %err, "skipping builtin canonical");
                    continue;
                }
                for alias in *aliases {
                    if let Err(err) = table.add_alias(alias, canonical) {
                        tracing::warn!(alias, team = canonical, %err, "skipping builtin alias");
                    }
                }
            }
            table
        })
    }

    pub fn add_canonical(&mut self, canonical: &str) -> Result<(), AliasTableError> {
        let display = canonical.trim();
        let key = display.to_lowercase();
        if key.is_empty() {
            return Err(AliasTableError::EmptyName);
        }
        if let Some(existing) = self.by_exact.get(&key) {
            if existing == display {
                return Ok(());
            }
            return Err(AliasTableError::CanonicalCollision {
                name: key,
                first: existing.clone(),
                second: display.to_string(),
            });
        }
        self.by_exact.insert(key, display.to_string());
        self.by_normalized
            .entry(normalize(display).to_lowercase())
            .or_default()
            .push(display.to_string());
        self.rows += 1;
        Ok(())
    }

    pub fn add_alias(&mut self, alias: &str, canonical: &str) -> Result<(), AliasTableError> {
        let target = match self.by_exact.get(&canonical.trim().to_lowercase()) {
            Some(t) => t.clone(),
            None => {
                return Err(AliasTableError::UnknownCanonical {
                    alias: alias.to_string(),
                    canonical: canonical.to_string(),
                })
            }
        };
        let key = alias.trim().to_lowercase();
        if key.is_empty() {
            return Err(AliasTableError::EmptyName);
        }
        if let Some(existing) = self.by_alias.get(&key) {
            if *existing == target {
                return Ok(());
            }
            return Err(AliasTableError::CanonicalCollision {
                name: key,
                first: existing.clone(),
                second: target,
            });
        }
        self.by_alias.insert(key, target.clone());
        let bucket = self
            .by_normalized_alias
            .entry(normalize(alias).to_lowercase())
            .or_default();
        if !bucket.contains(&target) {
            bucket.push(target);
        }
        Ok(())
    }

    /// Exact canonical match.
    pub fn canonical(&self, name: &str) -> Option<&str> {
        self.by_exact
            .get(&name.trim().to_lowercase())
            .map(String::as_str)
    }

    /// Direct alias match.
    pub fn from_alias(&self, name: &str) -> Option<&str> {
        self.by_alias
            .get(&name.trim().to_lowercase())
            .map(String::as_str)
    }

    /// Canonicals whose normalized form equals the given normalized name.
    pub fn from_normalized(&self, normalized: &str) -> &[String] {
        self.by_normalized
            .get(&normalized.trim().to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Canonicals reachable through an alias whose normalized form matches.
    pub fn from_normalized_alias(&self, normalized: &str) -> &[String] {
        self.by_normalized_alias
            .get(&normalized.trim().to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn canonicals(&self) -> impl Iterator<Item = &str> {
        self.by_exact.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }
}

/// Handle for refreshing the alias table without pausing readers. Readers
/// grab an `Arc` snapshot per request; a refresh swaps the whole table.
#[derive(Clone)]
pub struct SharedAliasTable {
    inner: Arc<RwLock<Arc<AliasTable>>>,
}

impl SharedAliasTable {
    pub fn new(table: AliasTable) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(table))),
        }
    }

    pub fn load(&self) -> Arc<AliasTable> {
        Arc::clone(&self.inner.read())
    }

    /// Replace the table, returning the previous one.
    pub fn swap(&self, table: AliasTable) -> Arc<AliasTable> {
        let next = Arc::new(table);
        let mut guard = self.inner.write();
        std::mem::replace(&mut *guard, next)
    }
}
