//! Device categories stored by the port registries.
//!
//! Each category is a closed enum of shared device handles plus a matching
//! kind tag. Concrete device types are members of exactly one category, so
//! asking the PWM registry for a `DigitalInput` does not compile, while
//! asking for a `Victor` on a port that holds a `Talon` is caught by the tag
//! check at run time.

use crate::drivers::simulation::{
    AnalogInput, AnalogOutput, Compressor, DigitalInput, DigitalOutput, DoubleSolenoid, Jaguar,
    Relay, Sd540, Servo, Solenoid, Spark, SpeedController, Talon, TalonSrx, Victor, VictorSp,
};
use semi_common::registry::{Kind, Member, Resource};
use std::fmt;
use std::sync::Arc;

macro_rules! device_category {
    (
        $(#[$meta:meta])*
        $base:ident / $kind:ident {
            $($variant:ident($ty:ty) => $name:literal,)+
        }
    ) => {
        #[doc = concat!("Kind tag of [`", stringify!($base), "`].")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $kind {
            $(
                #[doc = $name]
                $variant,
            )+
        }

        impl fmt::Display for $kind {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($name),)+
                }
            }
        }

        impl Kind for $kind {}

        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub enum $base {
            $(
                #[doc = $name]
                $variant(Arc<$ty>),
            )+
        }

        impl Resource for $base {
            type Kind = $kind;

            fn kind(&self) -> $kind {
                match self {
                    $(Self::$variant(_) => $kind::$variant,)+
                }
            }
        }

        $(
            impl Member<$base> for $ty {
                const KIND: $kind = $kind::$variant;

                fn into_base(this: Arc<Self>) -> $base {
                    $base::$variant(this)
                }

                fn from_base(base: &$base) -> Option<Arc<Self>> {
                    match base {
                        $base::$variant(device) => Some(Arc::clone(device)),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }
            }
        )+
    };
}

device_category! {
    /// Devices on the PWM header.
    PwmDevice / PwmKind {
        Spark(Spark) => "Spark",
        Talon(Talon) => "Talon",
        TalonSrx(TalonSrx) => "TalonSRX",
        Jaguar(Jaguar) => "Jaguar",
        Victor(Victor) => "Victor",
        VictorSp(VictorSp) => "VictorSP",
        Sd540(Sd540) => "SD540",
        Servo(Servo) => "Servo",
    }
}

device_category! {
    /// Devices on the digital I/O header. Inputs and outputs share channels.
    DioDevice / DioKind {
        Input(DigitalInput) => "DigitalInput",
        Output(DigitalOutput) => "DigitalOutput",
    }
}

device_category! {
    /// Analog input channels.
    AnalogInputDevice / AnalogInputKind {
        Input(AnalogInput) => "AnalogInput",
    }
}

device_category! {
    /// Analog output channels.
    AnalogOutputDevice / AnalogOutputKind {
        Output(AnalogOutput) => "AnalogOutput",
    }
}

device_category! {
    /// Spike relays.
    RelayDevice / RelayKind {
        Relay(Relay) => "Relay",
    }
}

device_category! {
    /// Compressors, keyed by pneumatics module.
    CompressorDevice / CompressorKind {
        Compressor(Compressor) => "Compressor",
    }
}

device_category! {
    /// Single and double solenoids, keyed by `SolenoidId`.
    SolenoidDevice / SolenoidKind {
        Single(Solenoid) => "Solenoid",
        Double(DoubleSolenoid) => "DoubleSolenoid",
    }
}

impl PwmDevice {
    /// The device as a motor controller. `None` for servos.
    pub fn as_speed_controller(&self) -> Option<Arc<dyn SpeedController>> {
        match self {
            Self::Spark(d) => Some(d.clone()),
            Self::Talon(d) => Some(d.clone()),
            Self::TalonSrx(d) => Some(d.clone()),
            Self::Jaguar(d) => Some(d.clone()),
            Self::Victor(d) => Some(d.clone()),
            Self::VictorSp(d) => Some(d.clone()),
            Self::Sd540(d) => Some(d.clone()),
            Self::Servo(_) => None,
        }
    }
}
