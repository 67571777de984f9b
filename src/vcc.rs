//! True supply voltage from the internal bandgap reference.
//!
//! The ADC multiplexer can route the fixed bandgap voltage to the converter
//! while Vcc serves as the reference. Measuring how large the known bandgap
//! reads relative to Vcc lets us back out Vcc itself:
//!
//! `Vcc = (bandgap_mv * 1024) / code`
//!
//! The bandgap is fixed per device but only nominally specified, so the
//! stored reference value is what calibration tunes.

use crate::bsp::adc::BandgapAdc;
use crate::bsp::clock::Clock;
use crate::bsp::nvm::NvStore;
use crate::bsp::serial::SerialPort;
use crate::calib::CalibrationSession;
use crate::record::CalibrationRecord;

/// Supply voltage in millivolts from the reference value and a raw bandgap
/// conversion code. Integer arithmetic, truncating.
///
/// A code of 0 cannot come from a settled conversion; it saturates the
/// result instead of dividing by zero.
pub fn supply_millivolts(bg_ref_mv: u16, raw_code: u16) -> u16 {
    if raw_code == 0 {
        return u16::MAX;
    }
    let mv = (bg_ref_mv as u32 * 1024) / raw_code as u32;
    mv.min(u16::MAX as u32) as u16
}

/// Rescale a 10-bit channel reading into millivolts against a measured Vcc.
pub fn analog_millivolts(vcc_mv: u16, raw_code: u16) -> u16 {
    ((raw_code as u32 * vcc_mv as u32) / 1023) as u16
}

/// Vcc measurement service. Owns the bandgap sampler, the non-volatile
/// store, and the single process-wide reference value the calibration
/// session adjusts.
pub struct PrecisionVcc<A, N> {
    adc: A,
    store: N,
    bg_ref_mv: u16,
}

impl<A, N> PrecisionVcc<A, N>
where
    A: BandgapAdc,
    N: NvStore,
{
    /// Start from a previously calibrated value if the store holds one,
    /// falling back to the device's nominal bandgap voltage.
    pub fn new(adc: A, store: N, nominal_mv: u16) -> Self {
        let mut vcc = Self::with_reference(adc, store, nominal_mv);
        vcc.load_reference();
        vcc
    }

    /// Use an already known reference value; the store is not consulted.
    pub fn with_reference(adc: A, store: N, bg_ref_mv: u16) -> Self {
        Self {
            adc,
            store,
            bg_ref_mv,
        }
    }

    pub fn bg_ref_mv(&self) -> u16 {
        self.bg_ref_mv
    }

    pub fn set_bg_ref_mv(&mut self, mv: u16) {
        self.bg_ref_mv = mv;
    }

    /// Nudge the reference by `delta_mv` millivolts. Unbounded; the
    /// operator drives this one step at a time.
    pub fn adjust_reference(&mut self, delta_mv: i16) {
        self.bg_ref_mv = self.bg_ref_mv.wrapping_add_signed(delta_mv);
    }

    /// Sample the bandgap channel once and translate to supply millivolts.
    pub fn read_vcc(&mut self) -> u16 {
        let code = self.adc.sample_bandgap();
        supply_millivolts(self.bg_ref_mv, code)
    }

    /// Persist the current reference under the expected format tag.
    pub fn save_reference(&mut self) {
        self.store.store(&CalibrationRecord::tagged(self.bg_ref_mv));
    }

    /// Adopt the stored reference if the slot holds a valid record.
    /// Returns false (and leaves the reference alone) otherwise.
    pub fn load_reference(&mut self) -> bool {
        let record = self.store.load();
        if record.is_valid() {
            self.bg_ref_mv = record.millivolts;
            true
        } else {
            false
        }
    }

    /// Run the interactive calibration session until the operator quits.
    pub fn calibrate<S, C>(&mut self, serial: &mut S, clock: &C)
    where
        S: SerialPort,
        C: Clock,
    {
        CalibrationSession::run(self, serial, clock);
    }
}
