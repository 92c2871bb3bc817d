//! Rapport de conversion
//!
//! Résumé d'un lot: paramètres, nombre d'enregistrements, durée et erreur
//! éventuelle. Affichable sur la console ou sauvegardable en JSON.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;

use crate::config::AreaType;
use crate::pipeline::RunOptions;

/// Statut global du lot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    /// Tous les enregistrements ont été convertis
    Success,
    /// Lot interrompu par une erreur
    Failed,
}

/// Rapport complet d'un lot
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub area_type: AreaType,
    pub status: RunStatus,
    /// Nombre d'enregistrements lus
    pub records: usize,
    pub parallel: bool,
    pub workers: usize,
    pub topojson: bool,
    pub duration_secs: f64,
    /// Message de l'erreur ayant interrompu le lot
    pub error: Option<String>,
}

impl RunReport {
    pub fn new(area_type: AreaType, options: &RunOptions) -> Self {
        Self {
            area_type,
            status: RunStatus::Success,
            records: 0,
            parallel: options.parallel,
            workers: if options.parallel { options.workers } else { 1 },
            topojson: options.emit_companion,
            duration_secs: 0.0,
            error: None,
        }
    }

    /// Enregistre un lot terminé
    pub fn record_success(&mut self, records: usize) {
        self.status = RunStatus::Success;
        self.records = records;
        self.error = None;
    }

    /// Enregistre un lot interrompu après `records` enregistrements lus
    pub fn record_failure(&mut self, records: usize, error: &dyn std::fmt::Display) {
        self.status = RunStatus::Failed;
        self.records = records;
        self.error = Some(error.to_string());
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("CONVERSION REPORT - {}", self.area_type);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);
        println!("Records: {}", self.records);
        println!(
            "Mode: {}",
            if self.parallel {
                format!("parallel ({} workers)", self.workers)
            } else {
                "serial".to_string()
            }
        );
        println!("TopoJSON: {}", if self.topojson { "yes" } else { "no" });

        if let Some(ref error) = self.error {
            println!("\n--- ERROR ---");
            println!("  {}", error);
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{}: {} records, {:?} in {:.2}s",
            self.area_type, self.records, self.status, self.duration_secs
        )
    }
}
