//! Orchestration d'un lot: lecture séquentielle, conversion en série ou sur un pool
//!
//! Étapes d'un lot:
//! 1. initialisation: validation du type de zone, création des racines de sortie
//! 2. streaming: un enregistrement à la fois depuis la source
//! 3. drainage (mode parallèle): attente de toutes les tâches soumises
//! 4. fin: nombre d'enregistrements lus

use std::sync::mpsc;

use tracing::{debug, error, info};

use cbf::{CbfError, RawFeature};

use crate::config::{AreaType, OutputConfig, Registry};
use crate::error::ConvertError;
use crate::export::{ensure_dir, OutputTarget, OutputWriter};
use crate::transform::Transformer;

/// Taille par défaut du pool de workers
pub const DEFAULT_WORKERS: usize = 4;

/// Nombre maximal de tâches en vol par défaut
pub const DEFAULT_QUEUE_DEPTH: usize = 16;

/// Options d'exécution d'un lot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Produire aussi le TopoJSON
    pub emit_companion: bool,

    /// Répartir les enregistrements sur un pool de workers
    pub parallel: bool,

    /// Taille du pool (mode parallèle)
    pub workers: usize,

    /// Tâches soumises non terminées au-delà desquelles la lecture attend
    pub queue_depth: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            emit_companion: false,
            parallel: false,
            workers: DEFAULT_WORKERS,
            queue_depth: DEFAULT_QUEUE_DEPTH,
        }
    }
}

/// Transformation + écriture d'un enregistrement
#[derive(Debug, Clone, Copy)]
pub struct Converter<'a> {
    transformer: Transformer<'a>,
    writer: &'a OutputWriter,
}

impl<'a> Converter<'a> {
    pub fn new(registry: &'a Registry, writer: &'a OutputWriter) -> Self {
        Self {
            transformer: Transformer::new(registry),
            writer,
        }
    }

    /// Convertit un enregistrement et écrit ses fichiers
    pub fn convert(
        &self,
        area_type: AreaType,
        raw: &RawFeature,
        emit_companion: bool,
    ) -> Result<OutputTarget, ConvertError> {
        let feature = self.transformer.transform(area_type, raw)?;
        self.writer.write(area_type, &feature, emit_companion)
    }
}

/// Convertit tous les enregistrements d'une source.
///
/// Retourne le nombre d'enregistrements lus. En série, la première erreur
/// arrête le lot. En parallèle, les tâches déjà soumises vont toujours à leur
/// terme et l'erreur retournée est celle de la tâche soumise le plus tôt.
pub fn run<I>(
    area_type: &str,
    registry: &Registry,
    output: &OutputConfig,
    records: I,
    options: &RunOptions,
) -> Result<usize, ConvertError>
where
    I: IntoIterator<Item = Result<RawFeature, CbfError>>,
{
    // Validation avant toute écriture
    let area_type = registry.lookup(area_type)?.area_type;

    ensure_dir(&output.geojson_root)?;
    if options.emit_companion {
        ensure_dir(&output.topojson_root)?;
    }

    let writer = OutputWriter::new(output.clone());
    let converter = Converter::new(registry, &writer);

    info!(
        area_type = %area_type,
        parallel = options.parallel,
        topojson = options.emit_companion,
        "Starting conversion"
    );

    let processed = if options.parallel {
        run_parallel(area_type, &converter, records, options)?
    } else {
        run_serial(area_type, &converter, records, options.emit_companion)?
    };

    info!(area_type = %area_type, processed = processed, "Conversion complete");
    Ok(processed)
}

fn run_serial<I>(
    area_type: AreaType,
    converter: &Converter<'_>,
    records: I,
    emit_companion: bool,
) -> Result<usize, ConvertError>
where
    I: IntoIterator<Item = Result<RawFeature, CbfError>>,
{
    let mut count = 0;
    for record in records {
        let record = record?;
        count += 1;
        converter.convert(area_type, &record, emit_companion)?;
    }
    Ok(count)
}

/// Première erreur par ordre de soumission
#[derive(Default)]
struct FirstFailure {
    failure: Option<(usize, ConvertError)>,
}

impl FirstFailure {
    fn record(&mut self, seq: usize, result: Result<OutputTarget, ConvertError>) {
        let Err(err) = result else {
            return;
        };

        error!(record = seq, error = %err, "Record failed");
        match self.failure {
            Some((first, _)) if first < seq => {}
            _ => self.failure = Some((seq, err)),
        }
    }

    fn into_result(self) -> Result<(), ConvertError> {
        match self.failure {
            Some((_, err)) => Err(err),
            None => Ok(()),
        }
    }
}

fn run_parallel<I>(
    area_type: AreaType,
    converter: &Converter<'_>,
    records: I,
    options: &RunOptions,
) -> Result<usize, ConvertError>
where
    I: IntoIterator<Item = Result<RawFeature, CbfError>>,
{
    let workers = options.workers.max(1);
    let queue_depth = options.queue_depth.max(1);
    let emit_companion = options.emit_companion;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("tiger-worker-{}", i))
        .build()
        .map_err(|e| ConvertError::WorkerPool(e.to_string()))?;

    debug!(workers = workers, queue_depth = queue_depth, "Worker pool ready");

    let (done_tx, done_rx) = mpsc::channel::<(usize, Result<OutputTarget, ConvertError>)>();
    let mut failures = FirstFailure::default();
    let mut source_error = None;
    let mut submitted = 0;

    pool.in_place_scope(|scope| {
        let mut in_flight = 0;

        for record in records {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    source_error = Some(e);
                    break;
                }
            };

            // Backpressure: on attend une fin de tâche avant de soumettre
            if in_flight >= queue_depth {
                if let Ok((seq, result)) = done_rx.recv() {
                    failures.record(seq, result);
                    in_flight -= 1;
                }
            }

            let seq = submitted;
            let done_tx = done_tx.clone();
            scope.spawn(move |_| {
                let result = converter.convert(area_type, &record, emit_companion);
                // Le récepteur vit jusqu'à la fin du drainage
                let _ = done_tx.send((seq, result));
            });
            submitted += 1;
            in_flight += 1;
        }

        // Drainage: toutes les tâches soumises vont à leur terme
        drop(done_tx);
        for (seq, result) in done_rx.iter() {
            failures.record(seq, result);
        }
    });

    if let Some(e) = source_error {
        return Err(e.into());
    }
    failures.into_result()?;

    Ok(submitted)
}
