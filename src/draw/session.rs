use draw_ledger::export::{self, Table, ALL_DRAWS_LABEL};
use rand::Rng;

use crate::draw::*;

/// A file ready to be written or downloaded.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ExportFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Everything one interactive session knows: the loaded participants, the
/// winners so far and the latest draw.
///
/// The session is handed to every operation by reference; nothing is global.
#[derive(Debug, Default)]
pub struct Session {
    participants: Option<ParticipantSet>,
    source_name: String,
    ledger: Ledger,
    latest: Option<Draw>,
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    /// Replaces the participants.
    ///
    /// The winners recorded so far are kept, so the new table must have the
    /// same columns unless the ledger is empty. Use [`Session::reset`] first to
    /// start over with a different table.
    pub fn load(&mut self, participants: ParticipantSet, source_name: &str) -> BLuckyDrawResult<()> {
        if let Some(current) = &self.participants {
            if !self.ledger.is_empty() && current.schema() != participants.schema() {
                return Err(Box::new(LuckyDrawError::Drawing {
                    source: DrawErrors::SchemaMismatch {
                        expected: current.schema().columns().to_vec(),
                        found: participants.schema().columns().to_vec(),
                    },
                }));
            }
        }
        info!(
            "Session::load: {} participants from {:?}",
            participants.len(),
            source_name
        );
        self.participants = Some(participants);
        self.source_name = source_name.to_string();
        Ok(())
    }

    /// Forgets the participants and all the winners.
    pub fn reset(&mut self) {
        info!("Session::reset");
        self.participants = None;
        self.source_name.clear();
        self.ledger.clear();
        self.latest = None;
    }

    pub fn participants(&self) -> Option<&ParticipantSet> {
        self.participants.as_ref()
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn latest(&self) -> Option<&Draw> {
        self.latest.as_ref()
    }

    pub fn draw<R: Rng + ?Sized>(
        &mut self,
        request: &DrawRequest,
        rng: &mut R,
    ) -> BLuckyDrawResult<&Draw> {
        let participants = self.participants.as_ref().context(NoParticipantsSnafu)?;
        let draw = perform_draw(participants, &mut self.ledger, request, rng).context(DrawingSnafu)?;
        Ok(&*self.latest.insert(draw))
    }

    fn schema(&self) -> BLuckyDrawResult<&Schema> {
        Ok(self
            .participants
            .as_ref()
            .map(|ps| ps.schema())
            .context(NoParticipantsSnafu)?)
    }

    /// The latest draw, named after the source: `<source>_result.<ext>`.
    pub fn latest_export(&self, format: ExportFormat) -> BLuckyDrawResult<Option<ExportFile>> {
        let draw = match &self.latest {
            Some(d) => d,
            None => return Ok(None),
        };
        let table = Table::for_draw(self.schema()?, draw);
        let bytes = table.to_bytes(format).context(ExportingSnafu {
            label: draw.name.as_str(),
        })?;
        Ok(Some(ExportFile {
            file_name: export::result_file_name(&self.source_name, format),
            bytes,
        }))
    }

    /// One file per draw name, in sorted order.
    pub fn group_exports(&self, format: ExportFormat) -> BLuckyDrawResult<Vec<ExportFile>> {
        let schema = self.schema()?;
        let mut res: Vec<ExportFile> = Vec::new();
        for (name, rows) in self.ledger.by_draw() {
            let bytes = Table::for_group(schema, name, &rows)
                .to_bytes(format)
                .context(ExportingSnafu {
                    label: name.as_str(),
                })?;
            res.push(ExportFile {
                file_name: export::file_name(name.as_str(), format),
                bytes,
            });
        }
        Ok(res)
    }

    /// Every winner of the session, sorted by draw name.
    pub fn ledger_export(&self, format: ExportFormat) -> BLuckyDrawResult<ExportFile> {
        let bytes = Table::for_ledger(self.schema()?, &self.ledger)
            .to_bytes(format)
            .context(ExportingSnafu {
                label: ALL_DRAWS_LABEL,
            })?;
        Ok(ExportFile {
            file_name: export::file_name(ALL_DRAWS_LABEL, format),
            bytes,
        })
    }
}
