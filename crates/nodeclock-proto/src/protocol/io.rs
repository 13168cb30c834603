use byteorder::{BE, ReadBytesExt, WriteBytesExt};
use std::io;

use super::bytes::{pack_first_octet, unpack_first_octet};
use super::{
    Packet, ReadBytes, ReadFromBytes, ReferenceId, ShortFormat, Stratum, TimestampFormat,
    WriteBytes, WriteToBytes,
};

impl<W: WriteBytesExt> WriteBytes for W {
    fn write_bytes<P: WriteToBytes>(&mut self, protocol: P) -> io::Result<()> {
        protocol.write_to_bytes(self)
    }
}

impl<R: ReadBytesExt> ReadBytes for R {
    fn read_bytes<P: ReadFromBytes>(&mut self) -> io::Result<P> {
        P::read_from_bytes(self)
    }
}

impl<P: WriteToBytes> WriteToBytes for &P {
    fn write_to_bytes<W: WriteBytesExt>(&self, writer: W) -> io::Result<()> {
        (**self).write_to_bytes(writer)
    }
}

impl WriteToBytes for ShortFormat {
    fn write_to_bytes<W: WriteBytesExt>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u16::<BE>(self.seconds)?;
        writer.write_u16::<BE>(self.fraction)
    }
}

impl ReadFromBytes for ShortFormat {
    fn read_from_bytes<R: ReadBytesExt>(mut reader: R) -> io::Result<Self> {
        Ok(ShortFormat {
            seconds: reader.read_u16::<BE>()?,
            fraction: reader.read_u16::<BE>()?,
        })
    }
}

impl WriteToBytes for TimestampFormat {
    fn write_to_bytes<W: WriteBytesExt>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u32::<BE>(self.seconds)?;
        writer.write_u32::<BE>(self.fraction)
    }
}

impl ReadFromBytes for TimestampFormat {
    fn read_from_bytes<R: ReadBytesExt>(mut reader: R) -> io::Result<Self> {
        Ok(TimestampFormat {
            seconds: reader.read_u32::<BE>()?,
            fraction: reader.read_u32::<BE>()?,
        })
    }
}

impl WriteToBytes for Stratum {
    fn write_to_bytes<W: WriteBytesExt>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u8(self.0)
    }
}

impl ReadFromBytes for Stratum {
    fn read_from_bytes<R: ReadBytesExt>(mut reader: R) -> io::Result<Self> {
        reader.read_u8().map(Stratum)
    }
}

impl WriteToBytes for ReferenceId {
    fn write_to_bytes<W: WriteBytesExt>(&self, mut writer: W) -> io::Result<()> {
        io::Write::write_all(&mut writer, &self.0)
    }
}

impl ReadFromBytes for ReferenceId {
    fn read_from_bytes<R: ReadBytesExt>(mut reader: R) -> io::Result<Self> {
        let mut octets = [0u8; 4];
        io::Read::read_exact(&mut reader, &mut octets)?;
        Ok(ReferenceId(octets))
    }
}

impl WriteToBytes for Packet {
    fn write_to_bytes<W: WriteBytesExt>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u8(pack_first_octet(self.leap_indicator, self.version, self.mode))?;
        writer.write_bytes(self.stratum)?;
        writer.write_i8(self.poll)?;
        writer.write_i8(self.precision)?;
        for short in [self.root_delay, self.root_dispersion] {
            writer.write_bytes(short)?;
        }
        writer.write_bytes(self.reference_id)?;
        for ts in [
            self.reference_timestamp,
            self.origin_timestamp,
            self.receive_timestamp,
            self.transmit_timestamp,
        ] {
            writer.write_bytes(ts)?;
        }
        Ok(())
    }
}

impl ReadFromBytes for Packet {
    fn read_from_bytes<R: ReadBytesExt>(mut reader: R) -> io::Result<Self> {
        let (leap_indicator, version, mode) = unpack_first_octet(reader.read_u8()?);
        Ok(Packet {
            leap_indicator,
            version,
            mode,
            stratum: reader.read_bytes()?,
            poll: reader.read_i8()?,
            precision: reader.read_i8()?,
            root_delay: reader.read_bytes()?,
            root_dispersion: reader.read_bytes()?,
            reference_id: reader.read_bytes()?,
            reference_timestamp: reader.read_bytes()?,
            origin_timestamp: reader.read_bytes()?,
            receive_timestamp: reader.read_bytes()?,
            transmit_timestamp: reader.read_bytes()?,
        })
    }
}
